//! Пропускной список с span-счётчиками: упорядоченное хранилище пар
//! `(member, score)` с ранговыми операциями за O(log n).
//!
//! Порядок полный: по возрастанию score, при равных score — по байтам
//! member. `span` уровня — дистанция в шагах уровня 0 до следующего
//! узла этого уровня; суммирование span'ов по пути спуска даёт ранг.
//! Значение span осмысленно только при наличии forward-ссылки, поэтому
//! вся span-арифметика — wrapping, как в беззнаковом оригинале.

use std::{
    marker::PhantomData,
    ptr::{self, NonNull},
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::safety::{SkipListStatistics, ValidationError};
use crate::{validate, Sds};

/// Максимальный уровень пропускного списка.
pub(crate) const MAX_LEVEL: usize = 32;

/// Вероятностный коэффициент повышения уровня (1/4).
const P: u32 = 0x4000;
const MASK: u32 = 0xFFFF;

type Link = Option<NonNull<Node>>;

/// Один уровень узла: forward-ссылка и дистанция до неё по уровню 0.
#[derive(Debug, Clone, Copy)]
struct Level {
    forward: Link,
    span: usize,
}

/// Узел пропускного списка. Высота узла фиксируется при вставке.
#[derive(Debug)]
pub struct Node {
    member: Sds,
    score: f64,
    backward: Link,
    levels: Box<[Level]>,
}

/// SkipList — структура с головным узлом, хвостом, текущим уровнем и
/// количеством элементов.
#[derive(Debug)]
pub struct SkipList {
    head: NonNull<Node>,
    tail: Link,
    level: usize,
    length: usize,
}

/// Диапазон по score с независимой исключительностью границ.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreRange {
    pub min: f64,
    pub max: f64,
    pub min_exclusive: bool,
    pub max_exclusive: bool,
}

/// Итератор по узлам списка в прямом порядке.
pub struct SkipListIter<'a> {
    current: Link,
    _marker: PhantomData<&'a Node>,
}

/// Итератор по узлам списка в обратном порядке (по backward-ссылкам).
pub struct ReverseIter<'a> {
    current: Link,
    _marker: PhantomData<&'a Node>,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl ScoreRange {
    /// Диапазон с обеими включительными границами.
    pub fn inclusive(
        min: f64,
        max: f64,
    ) -> Self {
        Self::new(min, max, false, false)
    }

    pub fn new(
        min: f64,
        max: f64,
        min_exclusive: bool,
        max_exclusive: bool,
    ) -> Self {
        ScoreRange {
            min,
            max,
            min_exclusive,
            max_exclusive,
        }
    }

    /// Пустой диапазон — это штатное значение, а не ошибка: min > max,
    /// либо равные границы с хотя бы одной исключительной.
    pub fn is_empty(&self) -> bool {
        self.min > self.max
            || (self.min == self.max && (self.min_exclusive || self.max_exclusive))
    }

    fn gte_min(
        &self,
        score: f64,
    ) -> bool {
        if self.min_exclusive {
            score > self.min
        } else {
            score >= self.min
        }
    }

    fn lte_max(
        &self,
        score: f64,
    ) -> bool {
        if self.max_exclusive {
            score < self.max
        } else {
            score <= self.max
        }
    }

    /// Проверяет попадание score в диапазон.
    pub fn contains(
        &self,
        score: f64,
    ) -> bool {
        self.gte_min(score) && self.lte_max(score)
    }
}

impl Node {
    fn new(
        member: Sds,
        score: f64,
        level: usize,
    ) -> Box<Self> {
        let levels = vec![
            Level {
                forward: None,
                span: 0,
            };
            level
        ]
        .into_boxed_slice();

        Box::new(Node {
            member,
            score,
            backward: None,
            levels,
        })
    }

    fn head() -> Box<Self> {
        Node::new(Sds::default(), 0.0, MAX_LEVEL)
    }

    /// Возвращает ссылку на член.
    pub fn member(&self) -> &Sds {
        &self.member
    }

    /// Возвращает score узла.
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Следующий узел в порядке возрастания.
    pub fn next(&self) -> Option<&Node> {
        unsafe { self.levels[0].forward.map(|n| &*n.as_ptr()) }
    }

    /// Предыдущий узел; `None` для первого узла списка.
    pub fn prev(&self) -> Option<&Node> {
        unsafe { self.backward.map(|n| &*n.as_ptr()) }
    }

    /// Узел строго меньше пары `(score, member)` в полном порядке
    /// списка.
    #[inline]
    fn precedes(
        &self,
        score: f64,
        member: &Sds,
    ) -> bool {
        self.score < score || (self.score == score && self.member < *member)
    }
}

impl SkipList {
    /// Создаёт новый пустой SkipList.
    pub fn new() -> Self {
        Self {
            head: unsafe { NonNull::new_unchecked(Box::into_raw(Node::head())) },
            tail: None,
            level: 1,
            length: 0,
        }
    }

    /// Генерирует случайный уровень для нового узла.
    #[inline(always)]
    fn random_level() -> usize {
        let mut lvl = 1;

        while lvl < MAX_LEVEL && (fastrand::u32(..) & MASK) < P {
            lvl += 1;
        }

        lvl
    }

    /// Вставляет пару `(member, score)`.
    ///
    /// Вызывающий гарантирует отсутствие member в списке (слой
    /// SortedSet проверяет это по своему хеш-индексу). NaN-score —
    /// нарушение контракта и приводит к панике.
    #[allow(clippy::needless_range_loop)]
    pub fn insert(
        &mut self,
        member: Sds,
        score: f64,
    ) {
        assert!(!score.is_nan(), "sorted set scores must not be NaN");

        unsafe {
            let mut update: [*mut Node; MAX_LEVEL] = [self.head.as_ptr(); MAX_LEVEL];
            let mut rank = [0usize; MAX_LEVEL];
            let mut cur = self.head.as_ptr();

            // спуск с накоплением рангов предшественников
            for i in (0..self.level).rev() {
                rank[i] = if i == self.level - 1 { 0 } else { rank[i + 1] };

                while let Some(next) = (*cur).levels[i].forward {
                    let n = next.as_ptr();

                    if (*n).precedes(score, &member) {
                        rank[i] = rank[i].wrapping_add((*cur).levels[i].span);
                        cur = n;
                    } else {
                        break;
                    }
                }

                update[i] = cur;
            }

            let lvl = Self::random_level();

            if lvl > self.level {
                for i in self.level..lvl {
                    rank[i] = 0;
                    update[i] = self.head.as_ptr();
                    (*update[i]).levels[i].span = self.length;
                }

                self.level = lvl;
            }

            let node = Node::new(member, score, lvl);
            let node_ptr = NonNull::new_unchecked(Box::into_raw(node));
            let x = node_ptr.as_ptr();

            for i in 0..lvl {
                (*x).levels[i].forward = (*update[i]).levels[i].forward;
                (*update[i]).levels[i].forward = Some(node_ptr);

                // старый span предшественника делится между ним и новым
                // узлом по дельте рангов
                (*x).levels[i].span = (*update[i]).levels[i]
                    .span
                    .wrapping_sub(rank[0] - rank[i]);
                (*update[i]).levels[i].span = (rank[0] - rank[i]) + 1;
            }

            // уровни выше нового узла просто стали на шаг длиннее
            for i in lvl..self.level {
                (*update[i]).levels[i].span = (*update[i]).levels[i].span.wrapping_add(1);
            }

            (*x).backward = if update[0] == self.head.as_ptr() {
                None
            } else {
                NonNull::new(update[0])
            };

            if let Some(next) = (*x).levels[0].forward {
                (*next.as_ptr()).backward = Some(node_ptr);
            } else {
                self.tail = Some(node_ptr);
            }

            self.length += 1;
        }
    }

    /// Удаляет узел с парой `(score, member)`. Возвращает `true`, если
    /// узел существовал.
    pub fn delete(
        &mut self,
        score: f64,
        member: &Sds,
    ) -> bool {
        unsafe {
            let mut update: [*mut Node; MAX_LEVEL] = [self.head.as_ptr(); MAX_LEVEL];
            let mut cur = self.head.as_ptr();

            for i in (0..self.level).rev() {
                while let Some(next) = (*cur).levels[i].forward {
                    let n = next.as_ptr();

                    if (*n).precedes(score, member) {
                        cur = n;
                    } else {
                        break;
                    }
                }

                update[i] = cur;
            }

            match (*update[0]).levels[0].forward {
                Some(node)
                    if (*node.as_ptr()).score == score
                        && (*node.as_ptr()).member == *member =>
                {
                    self.unlink(node, &update);
                    drop(Box::from_raw(node.as_ptr()));
                    true
                }
                _ => false,
            }
        }
    }

    /// Выщёлкивает узел из всех уровней, сращивая span'ы, чинит
    /// backward/tail и понижает уровень списка при необходимости.
    unsafe fn unlink(
        &mut self,
        node: NonNull<Node>,
        update: &[*mut Node; MAX_LEVEL],
    ) {
        let x = node.as_ptr();

        for i in 0..self.level {
            if (*update[i]).levels[i].forward == Some(node) {
                (*update[i]).levels[i].span = (*update[i]).levels[i]
                    .span
                    .wrapping_add((*x).levels[i].span)
                    .wrapping_sub(1);
                (*update[i]).levels[i].forward = (*x).levels[i].forward;
            } else {
                (*update[i]).levels[i].span = (*update[i]).levels[i].span.wrapping_sub(1);
            }
        }

        if let Some(next) = (*x).levels[0].forward {
            (*next.as_ptr()).backward = (*x).backward;
        } else {
            self.tail = (*x).backward;
        }

        while self.level > 1 && (*self.head.as_ptr()).levels[self.level - 1].forward.is_none() {
            self.level -= 1;
        }

        self.length -= 1;
    }

    /// Возвращает 0-based ранг пары `(score, member)` или `None`, если
    /// её нет в списке.
    pub fn rank(
        &self,
        score: f64,
        member: &Sds,
    ) -> Option<usize> {
        unsafe {
            let mut rank = 0usize;
            let mut cur = self.head.as_ptr();

            for i in (0..self.level).rev() {
                while let Some(next) = (*cur).levels[i].forward {
                    let n = next.as_ptr();

                    // нестрогое сравнение по member: остановка прямо на
                    // искомом узле с учётом его span'а
                    if (*n).score < score
                        || ((*n).score == score && (*n).member <= *member)
                    {
                        rank = rank.wrapping_add((*cur).levels[i].span);
                        cur = n;
                    } else {
                        break;
                    }
                }

                if !ptr::eq(cur, self.head.as_ptr()) && (*cur).member == *member {
                    return Some(rank - 1);
                }
            }

            None
        }
    }

    /// Возвращает узел с 0-based рангом `rank` спуском по span'ам.
    pub fn node_at_rank(
        &self,
        rank: usize,
    ) -> Option<&Node> {
        if rank >= self.length {
            return None;
        }

        let target = rank + 1;

        unsafe {
            let mut traversed = 0usize;
            let mut cur = self.head.as_ptr();

            for i in (0..self.level).rev() {
                while let Some(next) = (*cur).levels[i].forward {
                    if traversed + (*cur).levels[i].span > target {
                        break;
                    }

                    traversed += (*cur).levels[i].span;
                    cur = next.as_ptr();
                }

                if traversed == target {
                    return Some(&*cur);
                }
            }

            None
        }
    }

    /// Быстрая проверка: пересекается ли список с диапазоном вообще.
    fn overlaps(
        &self,
        range: &ScoreRange,
    ) -> bool {
        if range.is_empty() {
            return false;
        }

        unsafe {
            match self.tail {
                Some(t) if range.gte_min((*t.as_ptr()).score) => {}
                _ => return false,
            }

            match (*self.head.as_ptr()).levels[0].forward {
                Some(f) if range.lte_max((*f.as_ptr()).score) => {}
                _ => return false,
            }
        }

        true
    }

    /// Первый (минимальный) узел, чей score попадает в диапазон.
    pub fn first_in_score_range(
        &self,
        range: &ScoreRange,
    ) -> Option<&Node> {
        if !self.overlaps(range) {
            return None;
        }

        unsafe {
            let mut cur = self.head.as_ptr();

            for i in (0..self.level).rev() {
                while let Some(next) = (*cur).levels[i].forward {
                    if !range.gte_min((*next.as_ptr()).score) {
                        cur = next.as_ptr();
                    } else {
                        break;
                    }
                }
            }

            // overlaps гарантирует узел правее cur
            let node = &*(*cur).levels[0].forward?.as_ptr();

            if range.lte_max(node.score) {
                Some(node)
            } else {
                None
            }
        }
    }

    /// Последний (максимальный) узел, чей score попадает в диапазон.
    pub fn last_in_score_range(
        &self,
        range: &ScoreRange,
    ) -> Option<&Node> {
        if !self.overlaps(range) {
            return None;
        }

        unsafe {
            let mut cur = self.head.as_ptr();

            for i in (0..self.level).rev() {
                while let Some(next) = (*cur).levels[i].forward {
                    if range.lte_max((*next.as_ptr()).score) {
                        cur = next.as_ptr();
                    } else {
                        break;
                    }
                }
            }

            if ptr::eq(cur, self.head.as_ptr()) {
                return None;
            }

            let node = &*cur;

            if range.gte_min(node.score) {
                Some(node)
            } else {
                None
            }
        }
    }

    /// Возвращает текущее число элементов в списке.
    pub fn len(&self) -> usize {
        self.length
    }

    /// Проверяет на пустоту.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Возвращает первый элемент (минимальная пара) списка.
    pub fn first(&self) -> Option<&Node> {
        unsafe { (*self.head.as_ptr()).levels[0].forward.map(|n| &*n.as_ptr()) }
    }

    /// Возвращает последний элемент (максимальная пара) списка.
    pub fn last(&self) -> Option<&Node> {
        unsafe { self.tail.map(|n| &*n.as_ptr()) }
    }

    /// Возвращает итератор по `(&Sds, f64)` в порядке возрастания.
    pub fn iter(&self) -> SkipListIter<'_> {
        unsafe {
            SkipListIter {
                current: self.head.as_ref().levels[0].forward,
                _marker: PhantomData,
            }
        }
    }

    /// Возвращает итератор по элементам в обратном порядке.
    pub fn iter_rev(&self) -> ReverseIter<'_> {
        ReverseIter {
            current: self.tail,
            _marker: PhantomData,
        }
    }

    /// Удаляет все элементы из списка.
    pub fn clear(&mut self) {
        unsafe {
            let mut current = self.head.as_ref().levels[0].forward;

            while let Some(node) = current {
                current = node.as_ref().levels[0].forward;
                drop(Box::from_raw(node.as_ptr()));
            }

            let head = self.head.as_mut();

            for level in head.levels.iter_mut() {
                level.forward = None;
                level.span = 0;
            }

            self.tail = None;
            self.level = 1;
            self.length = 0;
        }
    }

    /// Собирает статистику распределения уровней.
    pub fn statistics(&self) -> SkipListStatistics {
        let mut stats = SkipListStatistics::empty(MAX_LEVEL);

        stats.current_max_level = self.level;

        unsafe {
            let mut cur = (*self.head.as_ptr()).levels[0].forward;

            while let Some(node) = cur {
                let n = node.as_ref();

                stats.node_count += 1;
                stats.level_distribution[n.levels.len() - 1] += 1;
                cur = n.levels[0].forward;
            }
        }

        stats.compute_average_level();
        stats
    }

    /// Полная структурная проверка: порядок, длина, backward/tail,
    /// span'ы против реальных дистанций по уровню 0.
    pub fn validate_invariants(&self) -> Result<(), ValidationError> {
        unsafe {
            let mut count = 0usize;
            let mut prev: *const Node = ptr::null();
            let mut cur = (*self.head.as_ptr()).levels[0].forward;

            while let Some(node_ptr) = cur {
                let node = node_ptr.as_ref();

                validate!(
                    count < self.length,
                    ValidationError::CyclicReference {
                        message: format!(
                            "more than {} nodes reachable at level 0",
                            self.length
                        )
                    }
                );

                validate!(
                    (1..=MAX_LEVEL).contains(&node.levels.len()),
                    ValidationError::InvalidLevel {
                        node_level: node.levels.len(),
                        max_level: MAX_LEVEL
                    }
                );

                if !prev.is_null() {
                    let p = &*prev;

                    validate!(
                        p.precedes(node.score, &node.member),
                        ValidationError::SortOrderViolation {
                            message: format!(
                                "({}, {:?}) before ({}, {:?})",
                                p.score, p.member, node.score, node.member
                            )
                        }
                    );
                }

                let expected_back = if prev.is_null() {
                    None
                } else {
                    NonNull::new(prev as *mut Node)
                };

                validate!(
                    node.backward == expected_back,
                    ValidationError::InvalidBackwardLink {
                        message: format!("node {:?}", node.member)
                    }
                );

                prev = node_ptr.as_ptr();
                count += 1;
                cur = node.levels[0].forward;
            }

            validate!(
                count == self.length,
                ValidationError::LengthMismatch {
                    expected: self.length,
                    actual: count
                }
            );

            let tail_ptr = self.tail.map(|n| n.as_ptr() as *const Node);
            let last_ptr = if prev.is_null() { None } else { Some(prev) };

            validate!(
                tail_ptr == last_ptr,
                ValidationError::InvalidTailLink {
                    message: "tail does not point at the last node".to_string()
                }
            );

            for i in 0..self.level {
                let mut cur = self.head.as_ptr();

                while let Some(next) = (*cur).levels[i].forward {
                    let span = (*cur).levels[i].span;

                    // реальная дистанция от cur до next по уровню 0
                    let mut steps = 0usize;
                    let mut walk = cur;

                    while steps <= self.length && !ptr::eq(walk, next.as_ptr()) {
                        match (*walk).levels[0].forward {
                            Some(n) => {
                                walk = n.as_ptr();
                                steps += 1;
                            }
                            None => break,
                        }
                    }

                    validate!(
                        ptr::eq(walk, next.as_ptr()),
                        ValidationError::CyclicReference {
                            message: format!(
                                "level {i} forward link skips past the level-0 chain"
                            )
                        }
                    );

                    validate!(
                        span == steps,
                        ValidationError::SpanMismatch {
                            level: i,
                            expected: steps,
                            actual: span
                        }
                    );

                    cur = next.as_ptr();
                }
            }
        }

        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для SkipList
////////////////////////////////////////////////////////////////////////////////

impl Default for SkipList {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a SkipList {
    type Item = (&'a Sds, f64);
    type IntoIter = SkipListIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a> Iterator for SkipListIter<'a> {
    type Item = (&'a Sds, f64);

    fn next(&mut self) -> Option<Self::Item> {
        unsafe {
            let node_ptr = self.current?;
            let node = node_ptr.as_ref();

            self.current = node.levels[0].forward;

            Some((&node.member, node.score))
        }
    }
}

impl<'a> Iterator for ReverseIter<'a> {
    type Item = (&'a Sds, f64);

    fn next(&mut self) -> Option<Self::Item> {
        unsafe {
            let node_ptr = self.current?;
            let node = node_ptr.as_ref();

            self.current = node.backward;

            Some((&node.member, node.score))
        }
    }
}

impl Serialize for SkipList {
    fn serialize<S>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let vec: Vec<(Sds, f64)> = self.iter().map(|(m, s)| (m.clone(), s)).collect();
        vec.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SkipList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let vec: Vec<(Sds, f64)> = Vec::deserialize(deserializer)?;
        let mut list = SkipList::new();

        for (m, s) in vec {
            list.insert(m, s);
        }

        Ok(list)
    }
}

impl Drop for SkipList {
    fn drop(&mut self) {
        // Безопасно обходим, начиная с первого элемента.
        unsafe {
            let mut current = (*self.head.as_ptr()).levels[0].forward;

            while let Some(node) = current {
                // Переходим к следующему узлу до освобождения текущего
                current = node.as_ref().levels[0].forward;
                drop(Box::from_raw(node.as_ptr()));
            }

            drop(Box::from_raw(self.head.as_ptr()));
        }
    }
}

impl PartialEq for SkipList {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.length == other.length && self.iter().eq(other.iter())
    }
}

impl Clone for SkipList {
    fn clone(&self) -> Self {
        let mut new = SkipList::new();

        for (m, s) in self.iter() {
            new.insert(m.clone(), s);
        }

        new
    }
}

unsafe impl Send for SkipList {}
unsafe impl Sync for SkipList {}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
