//! Spellbook Core Library
//!
//! 法术目录浏览与收藏夹同步的核心实现库
//!
//! # 模块
//!
//! - **catalog**: 远程法术目录（reqwest）
//! - **favorites**: 有序去重的收藏集合
//! - **store**: 本地键值存储（文件 / 内存）
//! - **persist**: 按顺序执行的收藏夹后台写入
//! - **state**: 显式状态与纯函数状态转换
//! - **controller**: 启动加载、用户操作、副作用执行
//! - **selection**: 详情视图选择状态
//!
//! # 使用示例
//!
//! ```ignore
//! use spellbook_core::{AppSettings, SpellController};
//!
//! let mut controller = SpellController::from_settings(&AppSettings::load())?;
//! controller.load_all().await;
//!
//! let fireball = controller.state().catalog()[0].clone();
//! if let Some(ticket) = controller.toggle_favorite(fireball) {
//!     ticket.wait().await?;
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod controller;
pub mod favorites;
pub mod logging;
pub mod persist;
pub mod selection;
pub mod spell;
pub mod state;
pub mod store;

pub use catalog::{CatalogClient, CatalogError, CatalogSource, StaticCatalog};
pub use config::AppSettings;
pub use controller::SpellController;
pub use favorites::{FavoriteSet, Toggle};
pub use persist::{FavoritesPersister, PersistError, PersistTicket};
pub use selection::Selection;
pub use spell::Spell;
pub use state::{Action, AppState, Effect, LoadStatus};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
