//! Итераторы словаря.
//!
//! Обычный итератор (`DictIter`) дополнительно сверяет отпечаток
//! структуры таблиц до и после обхода; safe-вариант (`SafeDictIter`)
//! приостанавливает инкрементальное рехеширование на время своей жизни,
//! чтобы ни один элемент не был пропущен и не выдан дважды.

use super::dict_base::{Dict, DictNode, HashTable};

/// Низкоуровневый обход обеих таблиц: бакеты `ht[0]`, затем `ht[1]`.
pub(crate) struct TableWalk<'a, K, V> {
    tables: [&'a HashTable<K, V>; 2],
    table: usize,
    bucket: usize,
    node: Option<&'a DictNode<K, V>>,
}

/// Итератор по парам `(&K, &V)` с контролем отпечатка.
pub struct DictIter<'a, K, V, S> {
    dict: &'a Dict<K, V, S>,
    walk: TableWalk<'a, K, V>,
    fingerprint: u64,
}

/// Итератор, приостанавливающий рехеширование до своего Drop.
pub struct SafeDictIter<'a, K, V, S> {
    dict: &'a Dict<K, V, S>,
    walk: TableWalk<'a, K, V>,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl<'a, K, V> TableWalk<'a, K, V> {
    pub(crate) fn new(tables: [&'a HashTable<K, V>; 2]) -> Self {
        TableWalk {
            tables,
            table: 0,
            bucket: 0,
            node: None,
        }
    }
}

impl<'a, K, V, S> DictIter<'a, K, V, S> {
    pub(crate) fn new(dict: &'a Dict<K, V, S>) -> Self {
        DictIter {
            dict,
            walk: dict.walk(),
            fingerprint: dict.fingerprint(),
        }
    }
}

impl<'a, K, V, S> SafeDictIter<'a, K, V, S> {
    pub(crate) fn new(dict: &'a Dict<K, V, S>) -> Self {
        dict.pause_rehash();

        SafeDictIter {
            dict,
            walk: dict.walk(),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов
////////////////////////////////////////////////////////////////////////////////

impl<'a, K, V> Iterator for TableWalk<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(node) = self.node {
                self.node = node.next.as_deref();
                return Some((&node.key, &node.val));
            }

            let table = self.tables[self.table];

            if self.bucket < table.size() {
                self.node = table.buckets[self.bucket].as_deref();
                self.bucket += 1;
            } else if self.table == 0 {
                self.table = 1;
                self.bucket = 0;
            } else {
                return None;
            }
        }
    }
}

impl<'a, K, V, S> Iterator for DictIter<'a, K, V, S> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.walk.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.dict.len()))
    }
}

impl<'a, K, V, S> Drop for DictIter<'a, K, V, S> {
    fn drop(&mut self) {
        // мутация словаря во время обхода — нарушение контракта;
        // borrow checker исключает её для безопасного кода, отпечаток
        // ловит остальное в debug-сборках
        debug_assert_eq!(
            self.fingerprint,
            self.dict.fingerprint(),
            "dict was structurally modified during iteration"
        );
    }
}

impl<'a, K, V, S> Iterator for SafeDictIter<'a, K, V, S> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.walk.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.dict.len()))
    }
}

impl<'a, K, V, S> Drop for SafeDictIter<'a, K, V, S> {
    fn drop(&mut self) {
        self.dict.resume_rehash();
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
