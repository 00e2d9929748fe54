pub(crate) mod clock;

pub(crate) mod executor;

pub(crate) mod logging;
