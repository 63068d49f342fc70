//! 收藏夹持久化
//!
//! 所有写入都交给一个后台任务按发出顺序依次执行，因此最后发出的写入就是最后落盘的写入。
//! 调用方不必等待写入完成；需要时可以通过 [`PersistTicket`] 或
//! [`FavoritesPersister::flush`] 观察结果。

use crate::favorites::FavoriteSet;
use crate::store::{KeyValueStore, StoreError};
use log::{debug, error};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// 持久化错误
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("Serialize error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Persistence writer stopped")]
    WriterStopped,
}

enum Command {
    Write {
        seq: u64,
        json: String,
        done: oneshot::Sender<Result<(), PersistError>>,
    },
    Flush(oneshot::Sender<()>),
}

/// 单次写入的结果句柄
///
/// 丢弃句柄不会取消写入。
#[must_use = "dropping the ticket does not cancel the write; call wait() to observe it"]
pub struct PersistTicket {
    seq: u64,
    rx: oneshot::Receiver<Result<(), PersistError>>,
}

impl PersistTicket {
    fn resolved(seq: u64, result: Result<(), PersistError>) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(result);
        Self { seq, rx }
    }

    /// 写入序号，按发出顺序递增
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// 等待写入完成
    pub async fn wait(self) -> Result<(), PersistError> {
        self.rx.await.unwrap_or(Err(PersistError::WriterStopped))
    }
}

/// 收藏夹写入器
pub struct FavoritesPersister {
    tx: mpsc::UnboundedSender<Command>,
    next_seq: u64,
}

impl FavoritesPersister {
    /// 启动后台写入任务
    ///
    /// 必须在 tokio 运行时内调用。
    pub fn spawn(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(store, key.into(), rx));
        Self { tx, next_seq: 0 }
    }

    /// 将整个集合排入写入队列
    pub fn save(&mut self, favorites: &FavoriteSet) -> PersistTicket {
        self.next_seq += 1;
        let seq = self.next_seq;

        let json = match favorites.to_json() {
            Ok(json) => json,
            Err(e) => {
                error!("Error saving favorites: {}", e);
                return PersistTicket::resolved(seq, Err(e.into()));
            }
        };

        let (done, rx) = oneshot::channel();
        if self.tx.send(Command::Write { seq, json, done }).is_err() {
            error!("Error saving favorites: writer stopped");
            return PersistTicket::resolved(seq, Err(PersistError::WriterStopped));
        }

        PersistTicket { seq, rx }
    }

    /// 等待已排队的写入全部完成
    pub async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        if self.tx.send(Command::Flush(tx)).is_ok() {
            let _ = rx.await;
        }
    }
}

async fn run_writer(
    store: Arc<dyn KeyValueStore>,
    key: String,
    mut rx: mpsc::UnboundedReceiver<Command>,
) {
    while let Some(command) = rx.recv().await {
        match command {
            Command::Write { seq, json, done } => {
                let result = store.set(&key, &json).await.map_err(PersistError::from);
                match &result {
                    Ok(()) => debug!("Saved favorites (write #{})", seq),
                    Err(e) => error!("Error saving favorites (write #{}): {}", seq, e),
                }
                let _ = done.send(result);
            }
            Command::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    debug!("Favorites writer stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spell::Spell;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    /// 每次写入都失败的存储
    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Ok(None)
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("disk full".to_string()))
        }
    }

    /// 第一次写入很慢的存储，记录写入顺序
    #[derive(Default)]
    struct SlowFirstStore {
        writes: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl KeyValueStore for SlowFirstStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Ok(self.writes.lock().unwrap().last().cloned())
        }

        async fn set(&self, _key: &str, value: &str) -> Result<(), StoreError> {
            let first = self.writes.lock().unwrap().is_empty();
            if first {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            self.writes.lock().unwrap().push(value.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_save_writes_json_array() {
        let store = Arc::new(MemoryStore::new());
        let mut persister = FavoritesPersister::spawn(store.clone(), "favorites");

        let set = FavoriteSet::from(vec![Spell::new("fireball", "Fireball", "...")]);
        persister.save(&set).wait().await.unwrap();

        assert_eq!(
            store.snapshot("favorites").as_deref(),
            Some(r#"[{"index":"fireball","name":"Fireball","desc":"..."}]"#)
        );
    }

    #[tokio::test]
    async fn test_write_failure_is_reported() {
        let mut persister = FavoritesPersister::spawn(Arc::new(BrokenStore), "favorites");

        let result = persister.save(&FavoriteSet::new()).wait().await;
        assert!(matches!(result, Err(PersistError::Store(_))));
    }

    #[tokio::test]
    async fn test_writes_land_in_issue_order() {
        let store = Arc::new(SlowFirstStore::default());
        let mut persister = FavoritesPersister::spawn(store.clone(), "favorites");

        let mut set = FavoriteSet::new();
        set.add(Spell::new("light", "Light", ""));
        let first = persister.save(&set);
        set.add(Spell::new("shield", "Shield", ""));
        let second = persister.save(&set);
        assert!(second.seq() > first.seq());

        persister.flush().await;

        let writes = store.writes.lock().unwrap().clone();
        assert_eq!(writes.len(), 2);
        assert!(writes[1].contains("shield"));
        assert!(!writes[0].contains("shield"));
    }
}
