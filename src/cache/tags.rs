//! 标签索引
//!
//! 记录每个标签当前关联的缓存键，用于按标签批量失效。
//! 同时维护反向映射 键 -> 标签，以便键被重新写入时清理旧关联。

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use super::lock::mutex_lock;

const SOURCE: &str = "cache::tags";

#[derive(Default)]
struct Associations {
    tag_to_keys: HashMap<String, HashSet<String>>,
    key_to_tags: HashMap<String, HashSet<String>>,
}

impl Associations {
    fn link(&mut self, tag: &str, key: &str) {
        self.tag_to_keys
            .entry(tag.to_string())
            .or_default()
            .insert(key.to_string());
        self.key_to_tags
            .entry(key.to_string())
            .or_default()
            .insert(tag.to_string());
    }

    fn unlink(&mut self, tag: &str, key: &str) {
        if let Some(keys) = self.tag_to_keys.get_mut(tag) {
            keys.remove(key);
            if keys.is_empty() {
                self.tag_to_keys.remove(tag);
            }
        }
        if let Some(tags) = self.key_to_tags.get_mut(key) {
            tags.remove(tag);
            if tags.is_empty() {
                self.key_to_tags.remove(key);
            }
        }
    }
}

/// 标签 -> 键集合 的索引
///
/// 所有操作都在同一把互斥锁内完成，锁内不做任何 I/O。
#[derive(Default)]
pub struct TagIndex {
    inner: Mutex<Associations>,
}

impl TagIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// 关联标签与键，重复调用无副作用
    pub fn associate(&self, tag: &str, key: &str) {
        mutex_lock(&self.inner, SOURCE, "associate").link(tag, key);
    }

    /// 用新的标签集合替换键的全部关联
    ///
    /// 上一次写入带有、这一次没有的标签会被解除关联。
    pub fn retag(&self, key: &str, tags: &[&str]) {
        let mut inner = mutex_lock(&self.inner, SOURCE, "retag");

        let stale: Vec<String> = inner
            .key_to_tags
            .get(key)
            .map(|current| {
                current
                    .iter()
                    .filter(|tag| !tags.contains(&tag.as_str()))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        for tag in &stale {
            inner.unlink(tag, key);
        }
        for tag in tags {
            inner.link(tag, key);
        }
    }

    /// 返回给定标签关联的键的并集
    pub fn keys_for_tags(&self, tags: &[&str]) -> HashSet<String> {
        let inner = mutex_lock(&self.inner, SOURCE, "keys_for_tags");
        tags.iter()
            .filter_map(|tag| inner.tag_to_keys.get(*tag))
            .flatten()
            .cloned()
            .collect()
    }

    /// 移除给定标签的全部关联，返回被移除的键的并集
    ///
    /// 返回值与移除动作在同一临界区内完成，是一致的快照。
    pub fn clear(&self, tags: &[&str]) -> HashSet<String> {
        let mut inner = mutex_lock(&self.inner, SOURCE, "clear");
        let mut removed = HashSet::new();

        for tag in tags {
            let Some(keys) = inner.tag_to_keys.remove(*tag) else {
                continue;
            };
            for key in keys {
                if let Some(key_tags) = inner.key_to_tags.get_mut(&key) {
                    key_tags.remove(*tag);
                    if key_tags.is_empty() {
                        inner.key_to_tags.remove(&key);
                    }
                }
                removed.insert(key);
            }
        }

        removed
    }

    /// 删除键的所有标签关联
    pub fn forget(&self, key: &str) {
        let mut inner = mutex_lock(&self.inner, SOURCE, "forget");
        if let Some(tags) = inner.key_to_tags.remove(key) {
            for tag in tags {
                if let Some(keys) = inner.tag_to_keys.get_mut(&tag) {
                    keys.remove(key);
                    if keys.is_empty() {
                        inner.tag_to_keys.remove(&tag);
                    }
                }
            }
        }
    }

    /// 当前带有至少一个键的标签数
    pub fn tag_count(&self) -> usize {
        mutex_lock(&self.inner, SOURCE, "tag_count").tag_to_keys.len()
    }

    /// 当前带有至少一个标签的键数
    pub fn key_count(&self) -> usize {
        mutex_lock(&self.inner, SOURCE, "key_count").key_to_tags.len()
    }
}
