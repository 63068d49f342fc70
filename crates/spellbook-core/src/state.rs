//! 应用状态
//!
//! 目录、收藏夹和选择状态放在同一个结构里，所有修改都通过
//! [`AppState::reduce`] 完成：旧状态 + 动作 -> 新状态 + 副作用。
//! `reduce` 本身不做 IO，副作用由 [`crate::controller::SpellController`] 执行。

use crate::favorites::{FavoriteSet, Toggle};
use crate::selection::Selection;
use crate::spell::Spell;

/// 异步加载状态
#[derive(Debug, Clone, Default, PartialEq)]
pub enum LoadStatus {
    #[default]
    Pending,
    Loaded,
    Failed(String),
}

impl LoadStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, LoadStatus::Pending)
    }
}

/// 状态动作
#[derive(Debug, Clone)]
pub enum Action {
    CatalogLoaded(Vec<Spell>),
    CatalogFailed(String),
    FavoritesLoaded(FavoriteSet),
    AddFavorite(Spell),
    RemoveFavorite(Spell),
    ToggleFavorite(Spell),
    OpenDetails(Spell),
    CloseDetails,
}

/// 需要控制器执行的副作用
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// 把整个收藏集合写入存储
    PersistFavorites(FavoriteSet),
}

/// 一次状态转换的结果
#[derive(Debug)]
pub struct Transition {
    pub state: AppState,
    pub effect: Option<Effect>,
}

/// 收藏夹加载完成前用户做的修改，加载完成后在存储内容上重放
#[derive(Debug, Clone, PartialEq)]
enum FavoriteEdit {
    Add(Spell),
    Remove(Spell),
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    catalog: Vec<Spell>,
    catalog_status: LoadStatus,
    favorites: FavoriteSet,
    favorites_status: LoadStatus,
    selection: Selection,
    early_edits: Vec<FavoriteEdit>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 目录，保持服务端返回顺序
    pub fn catalog(&self) -> &[Spell] {
        &self.catalog
    }

    pub fn catalog_status(&self) -> &LoadStatus {
        &self.catalog_status
    }

    pub fn favorites(&self) -> &FavoriteSet {
        &self.favorites
    }

    pub fn favorites_status(&self) -> &LoadStatus {
        &self.favorites_status
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn is_favorite(&self, spell: &Spell) -> bool {
        self.favorites.contains(spell)
    }

    pub fn reduce(mut self, action: Action) -> Transition {
        let effect = match action {
            Action::CatalogLoaded(spells) => {
                self.catalog = spells;
                self.catalog_status = LoadStatus::Loaded;
                None
            }
            Action::CatalogFailed(reason) => {
                self.catalog.clear();
                self.catalog_status = LoadStatus::Failed(reason);
                None
            }
            Action::FavoritesLoaded(stored) => self.apply_loaded_favorites(stored),
            Action::AddFavorite(spell) => {
                let changed = self.favorites.add(spell.clone());
                self.record_edit(changed, FavoriteEdit::Add(spell))
            }
            Action::RemoveFavorite(spell) => {
                let changed = self.favorites.remove(&spell);
                self.record_edit(changed, FavoriteEdit::Remove(spell))
            }
            Action::ToggleFavorite(spell) => {
                let edit = match self.favorites.toggle(spell.clone()) {
                    Toggle::Added => FavoriteEdit::Add(spell),
                    Toggle::Removed => FavoriteEdit::Remove(spell),
                };
                self.record_edit(true, edit)
            }
            Action::OpenDetails(spell) => {
                self.selection.open(spell);
                None
            }
            Action::CloseDetails => {
                self.selection.close();
                None
            }
        };

        Transition {
            state: self,
            effect,
        }
    }

    fn record_edit(&mut self, changed: bool, edit: FavoriteEdit) -> Option<Effect> {
        if !changed {
            return None;
        }
        // 存储内容还没读到，此时写入会覆盖它；等加载完成后统一写入
        if self.favorites_status.is_pending() {
            self.early_edits.push(edit);
            return None;
        }
        Some(Effect::PersistFavorites(self.favorites.clone()))
    }

    fn apply_loaded_favorites(&mut self, stored: FavoriteSet) -> Option<Effect> {
        self.favorites_status = LoadStatus::Loaded;
        self.favorites = stored;

        let edits = std::mem::take(&mut self.early_edits);
        if edits.is_empty() {
            return None;
        }

        for edit in edits {
            match edit {
                FavoriteEdit::Add(spell) => {
                    self.favorites.add(spell);
                }
                FavoriteEdit::Remove(spell) => {
                    self.favorites.remove(&spell);
                }
            }
        }
        Some(Effect::PersistFavorites(self.favorites.clone()))
    }
}
