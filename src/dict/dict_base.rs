//! Хеш-таблица (Dict) с инкрементальным рехешированием.
//!
//! Словарь держит две таблицы: `ht[0]` — основная, `ht[1]` — цель
//! миграции. Перестройка никогда не выполняется целиком за один вызов:
//! она разбита на шаги по бакетам, которые вызываются по одному из
//! мутирующих операций и пачками из `rehash_for_duration`.
//!
//! **ИНВАРИАНТЫ:**
//!
//! - `rehash_idx == -1`: рехеширование не идёт, все элементы в `ht[0]`,
//!   `ht[1]` не аллоцирована.
//! - `rehash_idx >= 0`: рехеширование в процессе; бакеты `ht[0]` с
//!   индексами меньше `rehash_idx` уже пусты, новые элементы попадают
//!   только в `ht[1]`.
//! - Общее число элементов всегда равно `ht[0].used + ht[1].used`.
//! - Размер каждой таблицы — степень двойки, `size_mask = size - 1`.

use std::{
    cell::Cell,
    hash::{BuildHasher, Hash, Hasher},
    time::{Duration, Instant},
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{
    entry::{Entry, OccupiedEntry, VacantEntry},
    iter::{DictIter, SafeDictIter, TableWalk},
};
use crate::{
    error::{DictError, DictResult},
    hashing::SipHashBuilder,
};

/// Начальный размер таблицы (степень двойки).
pub(crate) const INITIAL_SIZE: usize = 4;

/// Отношение used/size, после которого расширение выполняется даже при
/// выключенном автоматическом ресайзе.
const FORCE_EXPAND_RATIO: usize = 5;

/// Число бакетов на одну пачку в `rehash_for_duration`.
const REHASH_BATCH: usize = 100;

/// Бюджет посещений пустых бакетов на каждый запрошенный непустой
/// в `rehash_step`.
const EMPTY_VISITS_PER_STEP: usize = 10;

/// Конфигурация словаря: то, что в классических реализациях живёт в
/// глобальных флагах, здесь передаётся при создании.
#[derive(Debug, Clone, Copy)]
pub struct DictConfig {
    /// Разрешено ли автоматическое расширение/сжатие таблицы.
    pub resize_enabled: bool,
    /// Порог перегрузки, после которого расширение форсируется даже при
    /// `resize_enabled == false`.
    pub force_expand_ratio: usize,
}

/// Один элемент в цепочке коллизий.
#[derive(Debug, Clone)]
pub(crate) struct DictNode<K, V> {
    pub(crate) key: K,
    pub(crate) val: V,
    pub(crate) next: Option<Box<DictNode<K, V>>>,
}

/// Одна таблица: вектор бакетов, маска размера и число занятых
/// элементов.
#[derive(Debug, Clone)]
pub(crate) struct HashTable<K, V> {
    pub(crate) buckets: Vec<Option<Box<DictNode<K, V>>>>,
    pub(crate) size_mask: usize,
    pub(crate) used: usize,
}

/// Словарь с инкрементальным рехешированием и настраиваемым хешером.
#[derive(Debug, Clone)]
pub struct Dict<K, V, S = SipHashBuilder> {
    pub(crate) ht: [HashTable<K, V>; 2],
    pub(crate) rehash_idx: isize,
    /// Счётчик пауз: пока он больше нуля, шаги рехеширования не
    /// выполняются (safe-итераторы и явный `pause_rehash`).
    paused: Cell<usize>,
    hasher: S,
    config: DictConfig,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl<K, V> HashTable<K, V> {
    /// Неаллоцированная таблица.
    pub(crate) fn unallocated() -> Self {
        HashTable {
            buckets: Vec::new(),
            size_mask: 0,
            used: 0,
        }
    }

    /// Таблица ёмкостью `cap` бакетов (степень двойки, минимум
    /// `INITIAL_SIZE`).
    fn with_capacity(cap: usize) -> Self {
        let sz = cap.next_power_of_two().max(INITIAL_SIZE);
        let mut buckets = Vec::with_capacity(sz);

        buckets.resize_with(sz, || None);

        HashTable {
            buckets,
            size_mask: sz - 1,
            used: 0,
        }
    }

    #[inline]
    pub(crate) fn size(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    pub(crate) fn is_unallocated(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Сбрасывает таблицу в неаллоцированное состояние.
    fn clear(&mut self) {
        self.buckets.clear();
        self.buckets.shrink_to_fit();
        self.size_mask = 0;
        self.used = 0;
    }
}

impl<K, V> Dict<K, V>
where
    K: Hash + Eq,
{
    /// Создаёт пустой словарь с SipHash-хешером на seed'е процесса.
    pub fn new() -> Self {
        Self::with_config_and_hasher(DictConfig::default(), SipHashBuilder::default())
    }

    /// Создаёт пустой словарь с заданной конфигурацией.
    pub fn with_config(config: DictConfig) -> Self {
        Self::with_config_and_hasher(config, SipHashBuilder::default())
    }
}

impl<K, V, S> Dict<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Создаёт пустой словарь с заданным хешером.
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_config_and_hasher(DictConfig::default(), hasher)
    }

    pub fn with_config_and_hasher(config: DictConfig, hasher: S) -> Self {
        Dict {
            ht: [HashTable::unallocated(), HashTable::unallocated()],
            rehash_idx: -1,
            paused: Cell::new(0),
            hasher,
            config,
        }
    }

    /// Хеширует ключ настроенным хешером.
    #[inline]
    fn hash_key(&self, key: &K) -> u64 {
        let mut h = self.hasher.build_hasher();
        key.hash(&mut h);
        h.finish()
    }

    /// Переводит словарь в состояние рехеширования к ёмкости не меньше
    /// `target` (округляется вверх до степени двойки).
    ///
    /// Первый вызов на неаллоцированной таблице просто создаёт `ht[0]` —
    /// это инициализация, а не миграция.
    pub fn expand(&mut self, target: usize) -> DictResult<()> {
        if self.is_rehashing() {
            return Err(DictError::RehashInProgress);
        }

        let used = self.ht[0].used;

        if target < used {
            return Err(DictError::TargetBelowUsed { target, used });
        }

        let real = target.next_power_of_two().max(INITIAL_SIZE);

        if real == self.ht[0].size() {
            return Ok(());
        }

        let fresh = HashTable::with_capacity(real);

        if self.ht[0].is_unallocated() {
            self.ht[0] = fresh;
            return Ok(());
        }

        tracing::debug!(
            from = self.ht[0].size(),
            to = real,
            used,
            "dict expand: starting incremental rehash"
        );

        self.ht[1] = fresh;
        self.rehash_idx = 0;

        Ok(())
    }

    /// Сжимает (или расширяет) таблицу до минимальной степени двойки,
    /// вмещающей текущие элементы. Используется после массовых удалений.
    pub fn resize_to_fit(&mut self) -> DictResult<()> {
        if !self.config.resize_enabled {
            return Err(DictError::ResizeDisabled);
        }

        if self.is_rehashing() {
            return Err(DictError::RehashInProgress);
        }

        self.expand(self.ht[0].used.max(INITIAL_SIZE))
    }

    /// Выполняет до `n` шагов рехеширования (по непустым бакетам) с
    /// бюджетом `10 * n` на посещения пустых. Возвращает `true`, если
    /// миграция ещё не завершена.
    pub fn rehash_step(&mut self, n: usize) -> bool {
        if self.paused.get() > 0 || !self.is_rehashing() {
            return self.is_rehashing();
        }

        let mut empty_visits = n * EMPTY_VISITS_PER_STEP;
        let mut budget = n;

        while budget > 0 && self.ht[0].used > 0 {
            // used > 0 гарантирует непустой бакет правее rehash_idx
            let mut idx = self.rehash_idx as usize;

            debug_assert!(idx < self.ht[0].size(), "rehash cursor out of bounds");

            while self.ht[0].buckets[idx].is_none() {
                idx += 1;
                self.rehash_idx += 1;
                empty_visits -= 1;

                if empty_visits == 0 {
                    return true;
                }
            }

            // переносим всю цепочку бакета в ht[1]
            let mut node_opt = self.ht[0].buckets[idx].take();

            while let Some(mut node) = node_opt {
                node_opt = node.next.take();

                let slot = (self.hash_key(&node.key) as usize) & self.ht[1].size_mask;

                node.next = self.ht[1].buckets[slot].take();
                self.ht[1].buckets[slot] = Some(node);
                self.ht[0].used -= 1;
                self.ht[1].used += 1;
            }

            self.rehash_idx += 1;
            budget -= 1;
        }

        if self.is_rehashing() && self.ht[0].used == 0 {
            self.ht[0] = std::mem::replace(&mut self.ht[1], HashTable::unallocated());
            self.rehash_idx = -1;

            tracing::debug!(
                size = self.ht[0].size(),
                used = self.ht[0].used,
                "dict rehash complete"
            );

            return false;
        }

        self.is_rehashing()
    }

    /// Гонит рехеширование пачками, пока не истечёт `budget` или
    /// миграция не завершится. Возвращает `true`, если работа осталась.
    pub fn rehash_for_duration(&mut self, budget: Duration) -> bool {
        let start = Instant::now();
        let mut pending = self.is_rehashing();

        while pending && start.elapsed() < budget {
            pending = self.rehash_step(REHASH_BATCH);
        }

        pending
    }

    /// Запускает расширение при достижении load factor 1:1; при
    /// выключенном ресайзе — только после порога перегрузки.
    fn expand_if_needed(&mut self) {
        if self.is_rehashing() {
            return;
        }

        let size = self.ht[0].size();

        if size == 0 {
            // первая вставка: инициализация вместо миграции
            let _ = self.expand(INITIAL_SIZE);
            return;
        }

        let used = self.ht[0].used;

        if used >= size && (self.config.resize_enabled || used / size > self.config.force_expand_ratio)
        {
            // target >= used и рехеширование не идёт, ошибка невозможна
            let _ = self.expand(used * 2);
        }
    }

    /// Вставляет пару `(key, val)`. Существующий ключ обновляется;
    /// возвращается `true`, если ключ новый.
    pub fn insert(&mut self, key: K, val: V) -> bool {
        self.expand_if_needed();

        if self.is_rehashing() {
            self.rehash_step(1);
        }

        let hash = self.hash_key(&key);

        if let Some(slot) = self.lookup_mut(hash, &key) {
            *slot = val;
            return false;
        }

        // новый узел — в голову цепочки целевой таблицы
        let t = if self.is_rehashing() { 1 } else { 0 };
        let table = &mut self.ht[t];
        let slot = (hash as usize) & table.size_mask;
        let next = table.buckets[slot].take();

        table.buckets[slot] = Some(Box::new(DictNode { key, val, next }));
        table.used += 1;

        true
    }

    /// Возвращает entry для ключа: `Occupied` с доступом к существующему
    /// узлу или `Vacant` для вставки без повторного поиска.
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V> {
        self.expand_if_needed();

        if self.is_rehashing() {
            self.rehash_step(1);
        }

        let hash = self.hash_key(&key);
        let rehashing = self.is_rehashing();
        let mut found: Option<(usize, usize)> = None;

        for t in 0..=1 {
            let table = &self.ht[t];

            if !table.is_unallocated() {
                let slot = (hash as usize) & table.size_mask;
                let mut cur = table.buckets[slot].as_deref();

                while let Some(node) = cur {
                    if node.key == key {
                        found = Some((t, slot));
                        break;
                    }

                    cur = node.next.as_deref();
                }
            }

            if found.is_some() || !rehashing {
                break;
            }
        }

        match found {
            Some((t, slot)) => {
                let HashTable { buckets, used, .. } = &mut self.ht[t];

                // поднимаем найденный узел в голову цепочки: слот entry
                // указывает прямо на него, а порядок цепочки остаётся
                // «свежие — первыми»
                if let Some(mut node) = Self::unlink_from_chain(&mut buckets[slot], &key) {
                    node.next = buckets[slot].take();
                    buckets[slot] = Some(node);
                }

                Entry::Occupied(OccupiedEntry {
                    slot: &mut buckets[slot],
                    used,
                })
            }
            None => {
                let t = if rehashing { 1 } else { 0 };
                let HashTable {
                    buckets,
                    used,
                    size_mask,
                } = &mut self.ht[t];
                let slot = (hash as usize) & *size_mask;

                Entry::Vacant(VacantEntry {
                    key,
                    slot: &mut buckets[slot],
                    used,
                })
            }
        }
    }

    /// Возвращает `Some(&V)` для указанного ключа или `None`.
    pub fn get(&self, key: &K) -> Option<&V> {
        if self.len() == 0 {
            return None;
        }

        let hash = self.hash_key(key);

        for t in 0..=1 {
            let table = &self.ht[t];

            if !table.is_unallocated() {
                let slot = (hash as usize) & table.size_mask;
                let mut cur = table.buckets[slot].as_deref();

                while let Some(node) = cur {
                    if node.key == *key {
                        return Some(&node.val);
                    }

                    cur = node.next.as_deref();
                }
            }

            // без рехеширования ключ может быть только в ht[0]
            if !self.is_rehashing() {
                break;
            }
        }

        None
    }

    /// Возвращает `Some(&mut V)` для указанного ключа или `None`.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        if self.is_rehashing() {
            self.rehash_step(1);
        }

        if self.len() == 0 {
            return None;
        }

        let hash = self.hash_key(key);

        self.lookup_mut(hash, key)
    }

    #[inline]
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Удаляет ключ и возвращает его значение.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Удаляет ключ и возвращает владение парой `(K, V)` целиком:
    /// вызывающий может ещё раз использовать ключ перед освобождением.
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        if self.is_rehashing() {
            self.rehash_step(1);
        }

        if self.len() == 0 {
            return None;
        }

        let hash = self.hash_key(key);
        let rehashing = self.is_rehashing();

        for t in 0..=1 {
            let table = &mut self.ht[t];

            if !table.is_unallocated() {
                let slot = (hash as usize) & table.size_mask;

                if let Some(node) = Self::unlink_from_chain(&mut table.buckets[slot], key) {
                    table.used -= 1;
                    return Some((node.key, node.val));
                }
            }

            if !rehashing {
                break;
            }
        }

        None
    }

    /// Ищет `&mut V` в обеих таблицах по готовому хешу.
    fn lookup_mut(&mut self, hash: u64, key: &K) -> Option<&mut V> {
        let rehashing = self.is_rehashing();
        let [t0, t1] = &mut self.ht;
        let tables = if rehashing {
            [Some(t0), Some(t1)]
        } else {
            [Some(t0), None]
        };

        for table in tables.into_iter().flatten() {
            if table.is_unallocated() {
                continue;
            }

            let slot = (hash as usize) & table.size_mask;
            let mut cur = table.buckets[slot].as_deref_mut();

            while let Some(node) = cur {
                if node.key == *key {
                    return Some(&mut node.val);
                }

                cur = node.next.as_deref_mut();
            }
        }

        None
    }

    /// Вынимает из цепочки первый узел с ключом `key`, сохраняя
    /// владение узлом за вызывающим.
    pub(crate) fn unlink_from_chain(
        head: &mut Option<Box<DictNode<K, V>>>,
        key: &K,
    ) -> Option<Box<DictNode<K, V>>> {
        let mut cur = head;

        loop {
            match cur {
                None => return None,
                Some(node) if node.key == *key => {
                    let mut node = cur.take()?;
                    *cur = node.next.take();
                    return Some(node);
                }
                Some(node) => {
                    cur = &mut node.next;
                }
            }
        }
    }
}

impl<K, V, S> Dict<K, V, S> {
    /// Возвращает общее число элементов во всех таблицах.
    #[inline]
    pub fn len(&self) -> usize {
        self.ht[0].used + self.ht[1].used
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Текущее число бакетов (в обеих таблицах во время рехеширования).
    pub fn capacity(&self) -> usize {
        self.ht[0].size() + self.ht[1].size()
    }

    /// Возвращает `true`, если идёт инкрементальное рехеширование.
    #[inline]
    pub fn is_rehashing(&self) -> bool {
        self.rehash_idx != -1
    }

    /// Очищает словарь, освобождает обе таблицы и сбрасывает миграцию.
    pub fn clear(&mut self) {
        self.ht[0].clear();
        self.ht[1].clear();
        self.rehash_idx = -1;
    }

    /// Приостанавливает шаги рехеширования (вложенно).
    pub fn pause_rehash(&self) {
        self.paused.set(self.paused.get() + 1);
    }

    /// Снимает одну паузу рехеширования.
    pub fn resume_rehash(&self) {
        let n = self.paused.get();

        debug_assert!(n > 0, "resume_rehash without a matching pause_rehash");

        self.paused.set(n.saturating_sub(1));
    }

    /// Слепок структурного состояния таблиц. Несовпадение отпечатков до
    /// и после обхода означает запрещённую мутацию во время итерации —
    /// это нарушение контракта, а не восстановимая ошибка.
    pub fn fingerprint(&self) -> u64 {
        let integers = [
            self.ht[0].buckets.as_ptr() as u64,
            self.ht[0].size() as u64,
            self.ht[0].used as u64,
            self.ht[1].buckets.as_ptr() as u64,
            self.ht[1].size() as u64,
            self.ht[1].used as u64,
        ];

        let mut hash: u64 = 0;

        for n in integers {
            // 64-битный финальный микс Томаса Ванга
            hash = hash.wrapping_add(n);
            hash = (!hash).wrapping_add(hash << 21);
            hash ^= hash >> 24;
            hash = hash.wrapping_add(hash << 3).wrapping_add(hash << 8);
            hash ^= hash >> 14;
            hash = hash.wrapping_add(hash << 2).wrapping_add(hash << 4);
            hash ^= hash >> 28;
            hash = hash.wrapping_add(hash << 31);
        }

        hash
    }

    /// Итератор с проверкой отпечатка: мутировать словарь во время
    /// обхода запрещено (в Rust это гарантирует и borrow checker).
    pub fn iter(&self) -> DictIter<'_, K, V, S> {
        DictIter::new(self)
    }

    /// Safe-итератор: на время его жизни шаги рехеширования
    /// приостанавливаются, поэтому ни один элемент не будет пропущен
    /// или выдан дважды.
    pub fn iter_safe(&self) -> SafeDictIter<'_, K, V, S> {
        SafeDictIter::new(self)
    }

    /// Возвращает случайную пару из словаря.
    ///
    /// Выбор не идеально равномерен по элементам (цепочки разной
    /// длины), но на практике достаточен для сэмплирования.
    pub fn random_entry(&self) -> Option<(&K, &V)> {
        if self.len() == 0 {
            return None;
        }

        let head = loop {
            let candidate = if self.is_rehashing() {
                let s0 = self.ht[0].size();
                let total = s0 + self.ht[1].size();
                // бакеты ht[0] до rehash_idx уже перенесены и пусты
                let start = self.rehash_idx as usize;
                let h = start + fastrand::usize(..total - start);

                if h >= s0 {
                    self.ht[1].buckets[h - s0].as_deref()
                } else {
                    self.ht[0].buckets[h].as_deref()
                }
            } else {
                let mask = self.ht[0].size_mask;
                self.ht[0].buckets[fastrand::usize(..) & mask].as_deref()
            };

            if let Some(node) = candidate {
                break node;
            }
        };

        // равномерный выбор внутри цепочки: считаем длину, затем шагаем
        let mut chain_len = 0;
        let mut cur = Some(head);

        while let Some(node) = cur {
            chain_len += 1;
            cur = node.next.as_deref();
        }

        let pick = fastrand::usize(..chain_len);
        let mut node = head;

        for _ in 0..pick {
            if let Some(next) = node.next.as_deref() {
                node = next;
            }
        }

        Some((&node.key, &node.val))
    }

    /// Собирает до `count` пар, обходя непрерывный диапазон бакетов от
    /// случайной позиции. Число результатов не гарантируется точно, зато
    /// стоимость ограничена бюджетом `count * 10` шагов; длинные серии
    /// пустых бакетов прерываются перепрыгиванием в новую случайную
    /// точку.
    pub fn sample(&self, count: usize) -> Vec<(&K, &V)> {
        let count = count.min(self.len());
        let mut out = Vec::with_capacity(count);

        if count == 0 {
            return out;
        }

        let tables = if self.is_rehashing() { 2 } else { 1 };
        let maxsizemask = if tables == 2 {
            self.ht[0].size_mask.max(self.ht[1].size_mask)
        } else {
            self.ht[0].size_mask
        };

        let mut maxsteps = count * 10;
        let mut i = fastrand::usize(..) & maxsizemask;
        let mut emptylen = 0usize;

        while out.len() < count && maxsteps > 0 {
            maxsteps -= 1;

            for t in 0..tables {
                // невидимая зона ht[0]: бакеты до rehash_idx уже пусты
                if tables == 2 && t == 0 && i < self.rehash_idx as usize {
                    if i >= self.ht[1].size() {
                        i = self.rehash_idx as usize;
                    } else {
                        continue;
                    }
                }

                if i >= self.ht[t].size() {
                    continue;
                }

                let mut cur = self.ht[t].buckets[i].as_deref();

                if cur.is_none() {
                    emptylen += 1;

                    if emptylen >= 5 && emptylen > count {
                        i = fastrand::usize(..) & maxsizemask;
                        emptylen = 0;
                    }
                } else {
                    emptylen = 0;

                    while let Some(node) = cur {
                        out.push((&node.key, &node.val));

                        if out.len() == count {
                            return out;
                        }

                        cur = node.next.as_deref();
                    }
                }
            }

            i = (i + 1) & maxsizemask;
        }

        out
    }

    /// Инкрементальный обход всего словаря курсором с реверсивно-двоичным
    /// инкрементом.
    ///
    /// Начало обхода — курсор 0; обход закончен, когда возвращён 0.
    /// Гарантия: каждый бакет, существовавший в таблице на протяжении
    /// всего обхода, будет посещён хотя бы один раз, даже если таблица
    /// выросла или сжалась между вызовами. Элементы могут быть выданы
    /// повторно, добавленные во время обхода — выданы или нет.
    pub fn scan<F>(&self, cursor: u64, mut visit: F) -> u64
    where
        F: FnMut(&K, &V),
    {
        if self.len() == 0 {
            return 0;
        }

        let mut v = cursor;

        if !self.is_rehashing() {
            let t0 = &self.ht[0];
            let m0 = t0.size_mask as u64;

            Self::visit_bucket(t0, (v & m0) as usize, &mut visit);

            // реверсивно-двоичный инкремент: переворачиваем биты курсора,
            // прибавляем единицу, переворачиваем обратно
            v |= !m0;
            v = v.reverse_bits().wrapping_add(1).reverse_bits();
        } else {
            let (mut small, mut large) = (&self.ht[0], &self.ht[1]);

            if small.size() > large.size() {
                std::mem::swap(&mut small, &mut large);
            }

            let m0 = small.size_mask as u64;
            let m1 = large.size_mask as u64;

            Self::visit_bucket(small, (v & m0) as usize, &mut visit);

            // все бакеты большой таблицы, являющиеся расширением текущего
            // индекса малой
            loop {
                Self::visit_bucket(large, (v & m1) as usize, &mut visit);

                v |= !m1;
                v = v.reverse_bits().wrapping_add(1).reverse_bits();

                if v & (m0 ^ m1) == 0 {
                    break;
                }
            }
        }

        v
    }

    fn visit_bucket<F>(table: &HashTable<K, V>, idx: usize, visit: &mut F)
    where
        F: FnMut(&K, &V),
    {
        let mut cur = table.buckets[idx].as_deref();

        while let Some(node) = cur {
            visit(&node.key, &node.val);
            cur = node.next.as_deref();
        }
    }

    pub(crate) fn walk(&self) -> TableWalk<'_, K, V> {
        TableWalk::new([&self.ht[0], &self.ht[1]])
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для Dict
////////////////////////////////////////////////////////////////////////////////

impl Default for DictConfig {
    fn default() -> Self {
        DictConfig {
            resize_enabled: true,
            force_expand_ratio: FORCE_EXPAND_RATIO,
        }
    }
}

impl<K, V> Default for Dict<K, V>
where
    K: Hash + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, K, V, S> IntoIterator for &'a Dict<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = DictIter<'a, K, V, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, S> Serialize for Dict<K, V, S>
where
    K: Serialize,
    V: Serialize,
{
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de, K, V, S> Deserialize<'de> for Dict<K, V, S>
where
    K: Deserialize<'de> + Hash + Eq,
    V: Deserialize<'de>,
    S: BuildHasher + Default,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let pairs: Vec<(K, V)> = Vec::deserialize(deserializer)?;
        let mut dict = Dict::with_hasher(S::default());

        for (k, v) in pairs {
            dict.insert(k, v);
        }

        Ok(dict)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
