use crate::Executor;

pub trait Connection: Executor {
    /// Open a connection from a `<driver>://<location>[?params]` URL.
    fn connect(url: &str) -> anyhow::Result<Self>
    where
        Self: Sized;
}
