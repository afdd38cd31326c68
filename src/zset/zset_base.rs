//! Упорядоченное множество: хеш-индекс `member -> score` поверх
//! пропускного списка.
//!
//! Обе структуры описывают одно и то же множество: словарь даёт O(1)
//! доступ к score, список — порядок, ранги и диапазоны. Словарь хранит
//! собственную копию member (инлайновые строки клонируются дёшево),
//! поэтому структуры полностью независимы по владению.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{
    safety::ValidationError,
    skiplist_base::{ReverseIter, ScoreRange, SkipList, SkipListIter},
};
use crate::{
    dict::{Dict, Entry},
    validate, Sds,
};

/// Упорядоченное множество членов с вещественными оценками.
#[derive(Debug, Clone)]
pub struct SortedSet {
    dict: Dict<Sds, f64>,
    list: SkipList,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl SortedSet {
    /// Создаёт пустое множество.
    pub fn new() -> Self {
        SortedSet {
            dict: Dict::new(),
            list: SkipList::new(),
        }
    }

    /// Возвращает число членов множества.
    #[inline]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Вставляет член с оценкой. Возвращает `true`, если член новый.
    ///
    /// Существующий член с другой оценкой перемещается: удаление и
    /// вставка в список плюс обновление индекса выполняются как один
    /// логический шаг. Та же оценка — no-op. NaN — паника (нарушение
    /// контракта вызывающим).
    pub fn insert(
        &mut self,
        member: Sds,
        score: f64,
    ) -> bool {
        assert!(!score.is_nan(), "sorted set scores must not be NaN");

        match self.dict.entry(member.clone()) {
            Entry::Occupied(mut e) => {
                let old = *e.get();

                if old != score {
                    let moved = self.list.delete(old, &member);

                    debug_assert!(moved, "skiplist lost a member the index still holds");

                    self.list.insert(member, score);
                    e.insert(score);
                }

                false
            }
            Entry::Vacant(e) => {
                e.insert(score);
                self.list.insert(member, score);
                true
            }
        }
    }

    /// Удаляет член. Возвращает `true`, если он существовал.
    pub fn remove(
        &mut self,
        member: &Sds,
    ) -> bool {
        match self.dict.remove(member) {
            Some(score) => {
                let removed = self.list.delete(score, member);

                debug_assert!(removed, "skiplist lost a member the index still holds");

                true
            }
            None => false,
        }
    }

    /// Возвращает оценку члена за O(1).
    pub fn score(
        &self,
        member: &Sds,
    ) -> Option<f64> {
        self.dict.get(member).copied()
    }

    #[inline]
    pub fn contains(
        &self,
        member: &Sds,
    ) -> bool {
        self.dict.contains_key(member)
    }

    /// Возвращает 0-based ранг члена; `reverse` считает от максимальной
    /// оценки.
    pub fn rank(
        &self,
        member: &Sds,
        reverse: bool,
    ) -> Option<usize> {
        let score = self.score(member)?;
        let forward = self.list.rank(score, member)?;

        if reverse {
            Some(self.len() - 1 - forward)
        } else {
            Some(forward)
        }
    }

    /// Срез по рангам `[start, stop]` включительно, в стиле Python:
    /// отрицательные индексы отсчитываются с конца и клампятся.
    pub fn range_by_rank(
        &self,
        start: i64,
        stop: i64,
        reverse: bool,
    ) -> Vec<(&Sds, f64)> {
        let len = self.len() as i64;

        if len == 0 {
            return Vec::new();
        }

        let start = (if start < 0 { start + len } else { start }).max(0);
        let stop = (if stop < 0 { stop + len } else { stop }).min(len - 1);

        if start > stop {
            return Vec::new();
        }

        let count = (stop - start + 1) as usize;

        // ранги считаются в запрошенном направлении, поэтому для
        // обратного обхода стартуем с зеркального прямого ранга
        let first_rank = if reverse {
            (len - 1 - start) as usize
        } else {
            start as usize
        };

        let mut out = Vec::with_capacity(count);
        let mut node = self.list.node_at_rank(first_rank);

        while let Some(n) = node {
            if out.len() == count {
                break;
            }

            out.push((n.member(), n.score()));
            node = if reverse { n.prev() } else { n.next() };
        }

        out
    }

    /// Члены с оценками из диапазона, начиная с `offset`-го, не более
    /// `limit` штук (`None` — без ограничения). Пустой диапазон — это
    /// пустой результат, а не ошибка.
    pub fn range_by_score(
        &self,
        range: &ScoreRange,
        offset: usize,
        limit: Option<usize>,
        reverse: bool,
    ) -> Vec<(&Sds, f64)> {
        let mut node = if reverse {
            self.list.last_in_score_range(range)
        } else {
            self.list.first_in_score_range(range)
        };

        for _ in 0..offset {
            node = match node {
                Some(n) if reverse => n.prev(),
                Some(n) => n.next(),
                None => return Vec::new(),
            };
        }

        let mut out = Vec::new();

        while let Some(n) = node {
            if limit.is_some_and(|l| out.len() >= l) {
                break;
            }

            if !range.contains(n.score()) {
                break;
            }

            out.push((n.member(), n.score()));
            node = if reverse { n.prev() } else { n.next() };
        }

        out
    }

    /// Число членов с оценками из диапазона, через ранговую арифметику.
    pub fn count_in_range(
        &self,
        range: &ScoreRange,
    ) -> usize {
        let first = match self.list.first_in_score_range(range) {
            Some(n) => n,
            None => return 0,
        };
        let last = match self.list.last_in_score_range(range) {
            Some(n) => n,
            None => return 0,
        };

        // оба узла заведомо в списке
        let lo = self.list.rank(first.score(), first.member());
        let hi = self.list.rank(last.score(), last.member());

        match (lo, hi) {
            (Some(lo), Some(hi)) => hi - lo + 1,
            _ => 0,
        }
    }

    /// Возвращает случайный член с его оценкой.
    pub fn random_member(&self) -> Option<(&Sds, f64)> {
        self.dict.random_entry().map(|(m, s)| (m, *s))
    }

    /// До `count` различных случайных членов; всё множество, когда
    /// `count >= len`. Распределение best-effort, как у сэмплирования
    /// словаря.
    pub fn random_members(
        &self,
        count: usize,
    ) -> Vec<(&Sds, f64)> {
        if count >= self.len() {
            return self.iter().collect();
        }

        self.dict
            .sample(count)
            .into_iter()
            .map(|(m, s)| (m, *s))
            .collect()
    }

    /// Минимальная пара множества.
    pub fn first(&self) -> Option<(&Sds, f64)> {
        self.list.first().map(|n| (n.member(), n.score()))
    }

    /// Максимальная пара множества.
    pub fn last(&self) -> Option<(&Sds, f64)> {
        self.list.last().map(|n| (n.member(), n.score()))
    }

    /// Итератор по парам в порядке возрастания (score, member).
    pub fn iter(&self) -> SkipListIter<'_> {
        self.list.iter()
    }

    /// Итератор по парам в порядке убывания.
    pub fn iter_rev(&self) -> ReverseIter<'_> {
        self.list.iter_rev()
    }

    /// Удаляет все члены.
    pub fn clear(&mut self) {
        self.dict.clear();
        self.list.clear();
    }

    /// Проверяет инварианты списка и согласованность индекса с ним.
    pub fn validate_invariants(&self) -> Result<(), ValidationError> {
        self.list.validate_invariants()?;

        validate!(
            self.dict.len() == self.list.len(),
            ValidationError::IndexDivergence {
                message: format!(
                    "dict holds {} members, list holds {}",
                    self.dict.len(),
                    self.list.len()
                )
            }
        );

        for (member, score) in self.list.iter() {
            validate!(
                self.dict.get(member) == Some(&score),
                ValidationError::IndexDivergence {
                    message: format!("member {member:?} score differs between index and list")
                }
            );
        }

        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для SortedSet
////////////////////////////////////////////////////////////////////////////////

impl Default for SortedSet {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for SortedSet {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.list == other.list
    }
}

impl<'a> IntoIterator for &'a SortedSet {
    type Item = (&'a Sds, f64);
    type IntoIter = SkipListIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<(Sds, f64)> for SortedSet {
    fn from_iter<I: IntoIterator<Item = (Sds, f64)>>(iter: I) -> Self {
        let mut set = SortedSet::new();

        for (m, s) in iter {
            set.insert(m, s);
        }

        set
    }
}

impl Serialize for SortedSet {
    fn serialize<S>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.list.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SortedSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let pairs: Vec<(Sds, f64)> = Vec::deserialize(deserializer)?;

        Ok(pairs.into_iter().collect())
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
