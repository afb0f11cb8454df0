pub(crate) mod ellipsis;

pub(crate) use ellipsis::*;

pub type BoxFuture<'a, T> = futures::future::BoxFuture<'a, T>;

/// Pins and boxes a future so it can be returned from a capability closure.
#[macro_export]
macro_rules! boxed {
    ($fut:expr) => {
        Box::pin($fut) as $crate::utils::BoxFuture<'static, _>
    };
}
