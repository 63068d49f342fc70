//! 法术条目
//!
//! 目录和收藏夹共用同一个值类型，以 `index` 作为唯一标识。

use serde::{Deserialize, Deserializer, Serialize};
use std::hash::{Hash, Hasher};

/// 法术条目
///
/// 相等性和哈希只看 `index`，名称和描述不参与比较。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spell {
    /// 唯一标识（例如 "fireball"）
    pub index: String,
    /// 显示名称
    pub name: String,
    /// 描述文本
    #[serde(default, deserialize_with = "deserialize_desc")]
    pub desc: String,
    /// 法术等级（上游可能不返回）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    /// 上游详情路径
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Spell {
    pub fn new(index: impl Into<String>, name: impl Into<String>, desc: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            name: name.into(),
            desc: desc.into(),
            level: None,
            url: None,
        }
    }

    /// 是否与另一个条目是同一个法术
    pub fn same_as(&self, other: &Spell) -> bool {
        self.index == other.index
    }
}

impl PartialEq for Spell {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

impl Eq for Spell {}

impl Hash for Spell {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

/// 上游详情接口的 `desc` 是字符串数组，列表接口是字符串，这里两种都接受
fn deserialize_desc<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Desc {
        Text(String),
        Paragraphs(Vec<String>),
        Missing(()),
    }

    Ok(match Desc::deserialize(deserializer)? {
        Desc::Text(text) => text,
        Desc::Paragraphs(paragraphs) => paragraphs.join("\n\n"),
        Desc::Missing(()) => String::new(),
    })
}
