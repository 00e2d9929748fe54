//! [`ScriptedExecutor`], a simple implementation of [`CommandExecutor`] used in the integration
//! tests in place of a real sandbox.

use std::sync::{Arc, Mutex};

use agora::executor::CommandExecutor;
use agora::types::ExecutionOutcome;

/// Records every executed command, succeeds by echoing the command back, and fails on any
/// command starting with `"fail"`.
pub(crate) struct ScriptedExecutor {
    executed: Arc<Mutex<Vec<String>>>,
}

impl ScriptedExecutor {
    /// Create an executor together with a shared log of the commands it has run, in execution
    /// order.
    pub(crate) fn new() -> (ScriptedExecutor, Arc<Mutex<Vec<String>>>) {
        let executed = Arc::new(Mutex::new(Vec::new()));
        (
            ScriptedExecutor {
                executed: Arc::clone(&executed),
            },
            executed,
        )
    }
}

impl CommandExecutor for ScriptedExecutor {
    fn execute(&mut self, command: &str) -> ExecutionOutcome {
        self.executed.lock().unwrap().push(command.to_string());
        if command.starts_with("fail") {
            ExecutionOutcome::Failure(format!("refused to run: {}", command))
        } else {
            ExecutionOutcome::Success(format!("ran: {}", command))
        }
    }
}
