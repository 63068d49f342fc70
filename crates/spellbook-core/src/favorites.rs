//! 收藏夹
//!
//! 有序、按 `index` 去重的法术集合，以及从存储中加载它的逻辑。
//!
//! 持久化格式是 `Spell` 对象的 JSON 数组，没有版本号。

use crate::spell::Spell;
use crate::store::KeyValueStore;
use log::{debug, error, warn};
use serde::{Deserialize, Serialize};

/// 切换收藏的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
}

/// 收藏集合
///
/// 保持插入顺序，同一个 `index` 最多出现一次。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Spell>", into = "Vec<Spell>")]
pub struct FavoriteSet {
    spells: Vec<Spell>,
}

impl FavoriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, spell: &Spell) -> bool {
        self.contains_index(&spell.index)
    }

    pub fn contains_index(&self, index: &str) -> bool {
        self.spells.iter().any(|s| s.index == index)
    }

    /// 追加到末尾，已存在时不做任何修改
    ///
    /// 返回集合是否发生变化。
    pub fn add(&mut self, spell: Spell) -> bool {
        if self.contains(&spell) {
            return false;
        }
        self.spells.push(spell);
        true
    }

    /// 删除所有同 `index` 的条目
    ///
    /// 返回集合是否发生变化。
    pub fn remove(&mut self, spell: &Spell) -> bool {
        let before = self.spells.len();
        self.spells.retain(|s| s.index != spell.index);
        self.spells.len() != before
    }

    pub fn toggle(&mut self, spell: Spell) -> Toggle {
        if self.remove(&spell) {
            Toggle::Removed
        } else {
            self.spells.push(spell);
            Toggle::Added
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Spell> {
        self.spells.iter()
    }

    pub fn as_slice(&self) -> &[Spell] {
        &self.spells
    }

    pub fn len(&self) -> usize {
        self.spells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spells.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.spells)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl From<Vec<Spell>> for FavoriteSet {
    /// 重复条目只保留第一次出现的位置
    fn from(spells: Vec<Spell>) -> Self {
        let mut set = Self::new();
        for spell in spells {
            set.add(spell);
        }
        set
    }
}

impl From<FavoriteSet> for Vec<Spell> {
    fn from(set: FavoriteSet) -> Self {
        set.spells
    }
}

impl<'a> IntoIterator for &'a FavoriteSet {
    type Item = &'a Spell;
    type IntoIter = std::slice::Iter<'a, Spell>;

    fn into_iter(self) -> Self::IntoIter {
        self.spells.iter()
    }
}

/// 从存储加载收藏夹
///
/// 不存在时返回空集合；读取失败或内容损坏时记录日志并返回空集合。
pub async fn load_favorites(store: &dyn KeyValueStore, key: &str) -> FavoriteSet {
    let json = match store.get(key).await {
        Ok(Some(json)) => json,
        Ok(None) => {
            debug!("No stored favorites under {:?}", key);
            return FavoriteSet::new();
        }
        Err(e) => {
            error!("Error loading favorites: {}", e);
            return FavoriteSet::new();
        }
    };

    match FavoriteSet::from_json(&json) {
        Ok(set) => {
            debug!("Loaded {} favorites", set.len());
            set
        }
        Err(e) => {
            warn!("Stored favorites are corrupt, starting empty: {}", e);
            FavoriteSet::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn spell(index: &str) -> Spell {
        Spell::new(index, index.to_uppercase(), "")
    }

    fn indices(set: &FavoriteSet) -> Vec<&str> {
        set.iter().map(|s| s.index.as_str()).collect()
    }

    #[test]
    fn test_add_keeps_insertion_order() {
        let mut set = FavoriteSet::new();
        assert!(set.add(spell("fireball")));
        assert!(set.add(spell("acid-arrow")));

        assert_eq!(indices(&set), vec!["fireball", "acid-arrow"]);
    }

    #[test]
    fn test_add_twice_does_not_duplicate() {
        let mut set = FavoriteSet::new();
        assert!(set.add(spell("fireball")));
        assert!(!set.add(spell("fireball")));

        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_contains_after_add_and_remove() {
        let mut set = FavoriteSet::new();
        let fireball = spell("fireball");

        set.add(fireball.clone());
        assert!(set.contains(&fireball));

        set.remove(&fireball);
        assert!(!set.contains(&fireball));
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut set = FavoriteSet::from(vec![spell("light"), spell("shield")]);
        let before = set.clone();

        assert!(!set.remove(&spell("fireball")));
        assert_eq!(indices(&set), indices(&before));
    }

    #[test]
    fn test_toggle_twice_restores_membership() {
        let mut set = FavoriteSet::from(vec![spell("light")]);

        assert_eq!(set.toggle(spell("fireball")), Toggle::Added);
        assert_eq!(set.toggle(spell("fireball")), Toggle::Removed);
        assert_eq!(indices(&set), vec!["light"]);

        assert_eq!(set.toggle(spell("light")), Toggle::Removed);
        assert_eq!(set.toggle(spell("light")), Toggle::Added);
        assert_eq!(indices(&set), vec!["light"]);
    }

    #[test]
    fn test_json_roundtrip_preserves_order() {
        let set = FavoriteSet::from(vec![spell("shield"), spell("light"), spell("fireball")]);
        let json = set.to_json().unwrap();
        let parsed = FavoriteSet::from_json(&json).unwrap();

        assert_eq!(indices(&parsed), vec!["shield", "light", "fireball"]);
    }

    #[test]
    fn test_from_json_drops_duplicates() {
        let json = r#"[
            {"index":"light","name":"Light","desc":"a"},
            {"index":"fireball","name":"Fireball","desc":"b"},
            {"index":"light","name":"Light","desc":"c"}
        ]"#;
        let set = FavoriteSet::from_json(json).unwrap();

        assert_eq!(indices(&set), vec!["light", "fireball"]);
        assert_eq!(set.as_slice()[0].desc, "a");
    }

    #[tokio::test]
    async fn test_load_missing_key_is_empty() {
        let store = MemoryStore::new();
        let set = load_favorites(&store, "favorites").await;
        assert!(set.is_empty());
    }

    #[tokio::test]
    async fn test_load_malformed_json_is_empty() {
        let store = MemoryStore::new();
        store.set("favorites", "{not json").await.unwrap();

        let set = load_favorites(&store, "favorites").await;
        assert!(set.is_empty());
    }

    #[tokio::test]
    async fn test_load_stored_favorites() {
        let store = MemoryStore::new();
        store
            .set(
                "favorites",
                r#"[{"index":"fireball","name":"Fireball","desc":"..."}]"#,
            )
            .await
            .unwrap();

        let set = load_favorites(&store, "favorites").await;
        assert_eq!(indices(&set), vec!["fireball"]);
    }
}
