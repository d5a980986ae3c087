use std::future::Future;
use std::pin::Pin;

pub type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// 续体调度器：命令完成后的刷新回调都经由这里投递到宿主的事件循环。
pub trait AsyncExecutor: Send + Sync {
    fn spawn(&self, task: BoxFuture);
}

pub fn spawn_on<F>(executor: &dyn AsyncExecutor, task: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    executor.spawn(Box::pin(task));
}
