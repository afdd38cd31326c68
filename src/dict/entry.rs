//! Entry API словаря: доступ к паре по ключу без повторного поиска.
//!
//! `Dict::entry` поднимает найденный узел в голову цепочки бакета,
//! поэтому `OccupiedEntry` держит ссылку прямо на слот бакета и узел
//! гарантированно находится в его голове (unwrap'ы ниже опираются на
//! этот инвариант).

use super::dict_base::DictNode;

pub enum Entry<'a, K, V> {
    Occupied(OccupiedEntry<'a, K, V>),
    Vacant(VacantEntry<'a, K, V>),
}

pub struct OccupiedEntry<'a, K, V> {
    pub(crate) slot: &'a mut Option<Box<DictNode<K, V>>>,
    pub(crate) used: &'a mut usize,
}

pub struct VacantEntry<'a, K, V> {
    pub(crate) key: K,
    pub(crate) slot: &'a mut Option<Box<DictNode<K, V>>>,
    pub(crate) used: &'a mut usize,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl<'a, K, V> OccupiedEntry<'a, K, V> {
    #[inline]
    pub fn key(&self) -> &K {
        &self.slot.as_ref().unwrap().key
    }

    #[inline]
    pub fn get(&self) -> &V {
        &self.slot.as_ref().unwrap().val
    }

    #[inline]
    pub fn get_mut(&mut self) -> &mut V {
        &mut self.slot.as_mut().unwrap().val
    }

    #[inline]
    pub fn into_mut(self) -> &'a mut V {
        &mut self.slot.as_mut().unwrap().val
    }

    /// Заменяет значение, возвращая прежнее.
    #[inline]
    pub fn insert(
        &mut self,
        val: V,
    ) -> V {
        std::mem::replace(&mut self.slot.as_mut().unwrap().val, val)
    }

    /// Удаляет пару из словаря и возвращает значение.
    #[inline]
    pub fn remove(self) -> V {
        self.remove_entry().1
    }

    /// Удаляет пару из словаря и возвращает владение ключом и
    /// значением: ключ доступен вызывающему до освобождения.
    #[inline]
    pub fn remove_entry(self) -> (K, V) {
        let mut node = self.slot.take().unwrap();

        *self.slot = node.next.take();
        *self.used -= 1;

        (node.key, node.val)
    }
}

impl<'a, K, V> VacantEntry<'a, K, V> {
    #[inline]
    pub fn key(&self) -> &K {
        &self.key
    }

    #[inline]
    pub fn into_key(self) -> K {
        self.key
    }

    /// Вставляет значение в голову цепочки бакета.
    pub fn insert(
        self,
        val: V,
    ) -> &'a mut V {
        let old_head = self.slot.take();

        *self.slot = Some(Box::new(DictNode {
            key: self.key,
            val,
            next: old_head,
        }));

        *self.used += 1;
        &mut self.slot.as_mut().unwrap().val
    }
}

impl<'a, K, V> Entry<'a, K, V>
where
    V: Default,
{
    #[inline]
    pub fn or_default(self) -> &'a mut V {
        self.or_insert_with(V::default)
    }
}

impl<'a, K, V> Entry<'a, K, V> {
    pub fn or_insert(
        self,
        default: V,
    ) -> &'a mut V {
        match self {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => e.insert(default),
        }
    }

    pub fn or_insert_with(
        self,
        f: impl FnOnce() -> V,
    ) -> &'a mut V {
        match self {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => e.insert(f()),
        }
    }

    pub fn or_insert_with_key(
        self,
        f: impl FnOnce(&K) -> V,
    ) -> &'a mut V {
        match self {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => {
                let val = f(&e.key);
                e.insert(val)
            }
        }
    }

    pub fn and_modify(
        self,
        f: impl FnOnce(&mut V),
    ) -> Self {
        match self {
            Entry::Occupied(mut e) => {
                f(e.get_mut());
                Entry::Occupied(e)
            }
            Entry::Vacant(e) => Entry::Vacant(e),
        }
    }

    pub fn key(&self) -> &K {
        match self {
            Entry::Occupied(e) => e.key(),
            Entry::Vacant(e) => e.key(),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use crate::dict::{Dict, Entry};

    #[test]
    fn test_or_insert_and_counter_update() {
        let mut d: Dict<&str, u32> = Dict::new();

        *d.entry("hits").or_insert(0) += 1;
        *d.entry("hits").or_insert(0) += 1;

        assert_eq!(d.get(&"hits"), Some(&2));
        assert_eq!(d.len(), 1);
    }

    #[test]
    fn test_and_modify_only_touches_existing() {
        let mut d: Dict<&str, u32> = Dict::new();

        d.entry("a").and_modify(|v| *v += 1).or_insert(10);
        d.entry("a").and_modify(|v| *v += 1).or_insert(10);

        assert_eq!(d.get(&"a"), Some(&11));
    }

    #[test]
    fn test_occupied_insert_returns_old_value() {
        let mut d: Dict<&str, u32> = Dict::new();

        d.insert("k", 1);

        match d.entry("k") {
            Entry::Occupied(mut e) => {
                assert_eq!(e.key(), &"k");
                assert_eq!(e.insert(2), 1);
            }
            Entry::Vacant(_) => panic!("expected occupied entry"),
        }

        assert_eq!(d.get(&"k"), Some(&2));
    }

    #[test]
    fn test_occupied_remove_entry() {
        let mut d: Dict<String, u32> = Dict::new();

        d.insert("gone".to_string(), 5);

        match d.entry("gone".to_string()) {
            Entry::Occupied(e) => {
                let (k, v) = e.remove_entry();
                assert_eq!(k, "gone");
                assert_eq!(v, 5);
            }
            Entry::Vacant(_) => panic!("expected occupied entry"),
        }

        assert!(d.is_empty());
        assert_eq!(d.len(), 0);
    }

    #[test]
    fn test_vacant_keeps_key() {
        let mut d: Dict<String, u32> = Dict::new();

        match d.entry("new".to_string()) {
            Entry::Vacant(e) => {
                assert_eq!(e.key(), "new");
                e.insert(1);
            }
            Entry::Occupied(_) => panic!("expected vacant entry"),
        }

        assert_eq!(d.get(&"new".to_string()), Some(&1));
    }

    #[test]
    fn test_or_default() {
        let mut d: Dict<&str, Vec<u32>> = Dict::new();

        d.entry("list").or_default().push(1);
        d.entry("list").or_default().push(2);

        assert_eq!(d.get(&"list"), Some(&vec![1, 2]));
    }
}
