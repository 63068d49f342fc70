//! 法术列表控制器
//!
//! 持有 [`AppState`]，负责：
//! - 启动时并发加载目录和收藏夹（两者互不等待）
//! - 把用户操作转成 [`Action`] 交给 `reduce`
//! - 执行 `reduce` 产生的持久化副作用
//!
//! # 使用示例
//!
//! ```ignore
//! use spellbook_core::{AppSettings, SpellController};
//!
//! let settings = AppSettings::load();
//! let mut controller = SpellController::from_settings(&settings)?;
//!
//! // 非阻塞：后台加载，结果通过 poll_actions() 合并进状态
//! controller.start();
//! controller.poll_actions();
//!
//! // 阻塞：等两个加载都完成
//! controller.load_all().await;
//!
//! if let Some(spell) = controller.state().catalog().first().cloned() {
//!     controller.toggle_favorite(spell);
//! }
//! controller.flush().await;
//! ```

use crate::catalog::{CatalogClient, CatalogError, CatalogSource};
use crate::config::AppSettings;
use crate::favorites::load_favorites;
use crate::persist::{FavoritesPersister, PersistTicket};
use crate::spell::Spell;
use crate::state::{Action, AppState, Effect};
use crate::store::{FileStore, KeyValueStore};
use log::{error, info};
use std::sync::Arc;
use tokio::sync::mpsc;

pub struct SpellController {
    state: AppState,
    catalog: Arc<dyn CatalogSource>,
    store: Arc<dyn KeyValueStore>,
    favorites_key: String,
    persister: FavoritesPersister,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
}

impl SpellController {
    /// 创建控制器
    ///
    /// 会启动持久化写入任务，必须在 tokio 运行时内调用。
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        store: Arc<dyn KeyValueStore>,
        favorites_key: impl Into<String>,
    ) -> Self {
        let favorites_key = favorites_key.into();
        let persister = FavoritesPersister::spawn(store.clone(), favorites_key.clone());
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        Self {
            state: AppState::new(),
            catalog,
            store,
            favorites_key,
            persister,
            action_tx,
            action_rx,
        }
    }

    /// 按配置创建：reqwest 目录客户端 + 数据目录下的文件存储
    pub fn from_settings(settings: &AppSettings) -> Result<Self, CatalogError> {
        let catalog = CatalogClient::from_settings(settings)?;
        let store = FileStore::new(settings.data_dir.clone());
        Ok(Self::new(
            Arc::new(catalog),
            Arc::new(store),
            settings.favorites_key.clone(),
        ))
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// 在后台同时发起目录请求和收藏夹读取
    ///
    /// 结果以 [`Action`] 的形式送回，由 [`Self::poll_actions`] 或
    /// [`Self::next_action`] 合并进状态。
    pub fn start(&self) {
        let catalog = self.catalog.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(fetch_catalog(catalog.as_ref()).await);
        });

        let store = self.store.clone();
        let key = self.favorites_key.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let favorites = load_favorites(store.as_ref(), &key).await;
            let _ = tx.send(Action::FavoritesLoaded(favorites));
        });
    }

    /// 合并所有已到达的后台结果，返回处理的数量
    pub fn poll_actions(&mut self) -> usize {
        let mut count = 0;
        while let Ok(action) = self.action_rx.try_recv() {
            self.apply(action);
            count += 1;
        }
        count
    }

    /// 等待下一个后台结果并合并
    pub async fn next_action(&mut self) {
        // 控制器自己持有一个发送端，通道不会关闭
        if let Some(action) = self.action_rx.recv().await {
            self.apply(action);
        }
    }

    /// 请求目录并等待结果
    pub async fn load_catalog(&mut self) {
        let action = fetch_catalog(self.catalog.as_ref()).await;
        self.apply(action);
    }

    /// 读取收藏夹并等待结果
    pub async fn load_favorites(&mut self) {
        let favorites = load_favorites(self.store.as_ref(), &self.favorites_key).await;
        self.apply(Action::FavoritesLoaded(favorites));
    }

    /// 并发加载目录和收藏夹，两者都完成后返回
    pub async fn load_all(&mut self) {
        let (catalog, favorites) = tokio::join!(
            fetch_catalog(self.catalog.as_ref()),
            load_favorites(self.store.as_ref(), &self.favorites_key),
        );
        self.apply(catalog);
        self.apply(Action::FavoritesLoaded(favorites));
    }

    pub fn is_favorite(&self, spell: &Spell) -> bool {
        self.state.is_favorite(spell)
    }

    /// 加入收藏；已在收藏中或收藏夹尚未加载时不立即写入，返回 `None`
    pub fn add_to_favorites(&mut self, spell: Spell) -> Option<PersistTicket> {
        self.dispatch(Action::AddFavorite(spell))
    }

    /// 移出收藏；不在收藏中或收藏夹尚未加载时不立即写入，返回 `None`
    pub fn remove_from_favorites(&mut self, spell: &Spell) -> Option<PersistTicket> {
        self.dispatch(Action::RemoveFavorite(spell.clone()))
    }

    /// 切换收藏状态
    ///
    /// 收藏夹加载完成前返回 `None`：修改先记下来，加载完成后在存储内容上重放并写入一次。
    pub fn toggle_favorite(&mut self, spell: Spell) -> Option<PersistTicket> {
        self.dispatch(Action::ToggleFavorite(spell))
    }

    pub fn open_details(&mut self, spell: Spell) {
        self.apply(Action::OpenDetails(spell));
    }

    pub fn close_details(&mut self) {
        self.apply(Action::CloseDetails);
    }

    /// 等待已排队的收藏夹写入全部完成
    pub async fn flush(&self) {
        self.persister.flush().await;
    }

    /// 执行一个动作，返回其持久化副作用的句柄（如果有）
    pub fn dispatch(&mut self, action: Action) -> Option<PersistTicket> {
        let transition = std::mem::take(&mut self.state).reduce(action);
        self.state = transition.state;

        transition.effect.map(|effect| match effect {
            Effect::PersistFavorites(favorites) => self.persister.save(&favorites),
        })
    }

    /// 执行动作，不关心写入结果（失败已在写入任务中记录日志）
    fn apply(&mut self, action: Action) {
        let _ = self.dispatch(action);
    }
}

async fn fetch_catalog(catalog: &dyn CatalogSource) -> Action {
    match catalog.load().await {
        Ok(spells) => {
            info!("Loaded {} spells", spells.len());
            Action::CatalogLoaded(spells)
        }
        Err(e) => {
            error!("Error fetching spell data: {}", e);
            Action::CatalogFailed(e.to_string())
        }
    }
}
