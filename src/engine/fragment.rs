//! 请求内分片缓存
//!
//! 一个 `Fragment` 对应一类数据（资源、题目、布置、花名册、统计……），
//! 同一个键在一次请求内最多取数一次。取到 "不存在" 也会被记录，之后不再重试。

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;

use tracing::debug;

use crate::errors::Result;

pub struct Fragment<K, V> {
    name: &'static str,
    entries: HashMap<K, Option<V>>,
}

impl<K, V> Fragment<K, V>
where
    K: Eq + Hash + Clone + Debug,
{
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: HashMap::new(),
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key).and_then(Option::as_ref)
    }

    /// 已经取过数（无论是否存在）
    pub fn is_resolved(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// 用调用方已有的数据预填，已存在的键不覆盖
    pub fn seed(&mut self, key: K, value: V) {
        self.entries.entry(key).or_insert(Some(value));
    }

    /// 命中直接返回，否则执行一次 `fetch` 并记录结果
    pub async fn get_or_fetch<F, Fut>(&mut self, key: K, fetch: F) -> Result<Option<&V>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<V>>>,
    {
        let name = self.name;
        match self.entries.entry(key) {
            Entry::Occupied(entry) => Ok(entry.into_mut().as_ref()),
            Entry::Vacant(entry) => {
                debug!(fragment = name, key = ?entry.key(), "fragment miss, fetching");
                let value = fetch().await?;
                Ok(entry.insert(value).as_ref())
            }
        }
    }

    /// 批量版本：只把尚未取过的键交给 `fetch`，一次取回
    pub async fn fetch_missing<F, Fut>(&mut self, keys: &[K], fetch: F) -> Result<()>
    where
        F: FnOnce(Vec<K>) -> Fut,
        Fut: Future<Output = Result<Vec<(K, V)>>>,
    {
        let mut missing: Vec<K> = Vec::new();
        for key in keys {
            if !self.entries.contains_key(key) && !missing.contains(key) {
                missing.push(key.clone());
            }
        }
        if missing.is_empty() {
            return Ok(());
        }

        debug!(fragment = self.name, keys = ?missing, "fragment batch miss, fetching");
        let fetched = fetch(missing.clone()).await?;
        for (key, value) in fetched {
            self.entries.insert(key, Some(value));
        }
        for key in missing {
            self.entries.entry(key).or_insert(None);
        }
        Ok(())
    }

    /// 取过数但不存在的键
    pub fn absent<'k>(&self, keys: impl IntoIterator<Item = &'k K>) -> Vec<K>
    where
        K: 'k,
    {
        keys.into_iter()
            .filter(|key| matches!(self.entries.get(*key), Some(None)))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ReportError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_get_or_fetch_runs_once() {
        let calls = AtomicUsize::new(0);
        let mut fragment: Fragment<i64, String> = Fragment::new("tasks");

        for _ in 0..3 {
            let value = fragment
                .get_or_fetch(1, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, ReportError>(Some("T1".to_string()))
                })
                .await
                .unwrap()
                .cloned();
            assert_eq!(value.as_deref(), Some("T1"));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_absent_value_is_not_refetched() {
        let calls = AtomicUsize::new(0);
        let mut fragment: Fragment<i64, String> = Fragment::new("reports");

        for _ in 0..2 {
            let value = fragment
                .get_or_fetch(7, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, ReportError>(None)
                })
                .await
                .unwrap();
            assert!(value.is_none());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(fragment.is_resolved(&7));
    }

    #[tokio::test]
    async fn test_fetch_missing_only_requests_new_keys() {
        let mut fragment: Fragment<i64, i64> = Fragment::new("reports");
        fragment.seed(1, 10);

        let mut requested = Vec::new();
        fragment
            .fetch_missing(&[1, 2, 3, 2], |keys| {
                requested = keys.clone();
                async move {
                    Ok::<_, ReportError>(
                        keys.into_iter()
                            .filter(|k| *k != 3)
                            .map(|k| (k, k * 10))
                            .collect(),
                    )
                }
            })
            .await
            .unwrap();

        assert_eq!(requested, vec![2, 3]);
        assert_eq!(fragment.get(&2), Some(&20));
        assert_eq!(fragment.absent(&[1, 2, 3]), vec![3]);

        // 第二次全部命中，不再调用
        let calls = AtomicUsize::new(0);
        fragment
            .fetch_missing(&[1, 2, 3], |_| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, ReportError>(Vec::new())
            })
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
