//! Ключевое (seeded) хеширование для всех таблиц движка.
//!
//! Используется SipHash-1-3 со 128-битным ключом: детерминированный
//! keyed-хеш, устойчивый к hash-flooding атакам. Seed процесса задаётся
//! один раз до первого обращения (`set_hash_seed`); если встраивающий
//! код его не задал, при первом обращении генерируется случайный.
//!
//! Помимо обычного варианта есть регистронезависимый (`Nocase*`):
//! байты приводятся к нижнему ASCII-регистру прямо при подаче в хешер.

use std::hash::{BuildHasher, Hasher};

use once_cell::sync::OnceCell;
use siphasher::sip::SipHasher13;

/// 128-битный seed процесса в виде пары ключей SipHash.
static HASH_SEED: OnceCell<(u64, u64)> = OnceCell::new();

/// Устанавливает seed процесса. Возвращает `false`, если seed уже
/// зафиксирован (первым вызовом или первым обращением к хешеру) —
/// менять его после этого нельзя, иначе таблицы потеряют свои ключи.
pub fn set_hash_seed(k0: u64, k1: u64) -> bool {
    HASH_SEED.set((k0, k1)).is_ok()
}

/// Возвращает seed процесса, генерируя случайный при первом обращении.
pub fn hash_seed() -> (u64, u64) {
    *HASH_SEED.get_or_init(|| (fastrand::u64(..), fastrand::u64(..)))
}

/// `BuildHasher` на базе SipHash-1-3 с явным 128-битным ключом.
///
/// По умолчанию берёт seed процесса, но каждая таблица может получить
/// собственный ключ через [`SipHashBuilder::with_keys`].
#[derive(Debug, Clone, Copy)]
pub struct SipHashBuilder {
    k0: u64,
    k1: u64,
}

/// Регистронезависимый вариант: ASCII-байты приводятся к нижнему
/// регистру до хеширования, поэтому `"Key"` и `"key"` попадают в один
/// бакет.
#[derive(Debug, Clone, Copy)]
pub struct NocaseSipHashBuilder {
    k0: u64,
    k1: u64,
}

/// Хешер, складывающий каждый байт в нижнем ASCII-регистре.
pub struct NocaseSipHasher(SipHasher13);

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl SipHashBuilder {
    /// Создаёт builder с ключами seed'а процесса.
    pub fn from_process_seed() -> Self {
        let (k0, k1) = hash_seed();
        SipHashBuilder { k0, k1 }
    }

    /// Создаёт builder с явной парой ключей.
    pub fn with_keys(k0: u64, k1: u64) -> Self {
        SipHashBuilder { k0, k1 }
    }
}

impl NocaseSipHashBuilder {
    pub fn from_process_seed() -> Self {
        let (k0, k1) = hash_seed();
        NocaseSipHashBuilder { k0, k1 }
    }

    pub fn with_keys(k0: u64, k1: u64) -> Self {
        NocaseSipHashBuilder { k0, k1 }
    }
}

/// Хеширует сырые байты ключом процесса (регистрозависимо).
pub fn gen_hash(data: &[u8]) -> u64 {
    let mut h = SipHashBuilder::from_process_seed().build_hasher();
    h.write(data);
    h.finish()
}

/// Хеширует сырые байты ключом процесса без учёта ASCII-регистра.
pub fn gen_case_hash(data: &[u8]) -> u64 {
    let mut h = NocaseSipHashBuilder::from_process_seed().build_hasher();
    h.write(data);
    h.finish()
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов
////////////////////////////////////////////////////////////////////////////////

impl Default for SipHashBuilder {
    fn default() -> Self {
        Self::from_process_seed()
    }
}

impl BuildHasher for SipHashBuilder {
    type Hasher = SipHasher13;

    fn build_hasher(&self) -> Self::Hasher {
        SipHasher13::new_with_keys(self.k0, self.k1)
    }
}

impl Default for NocaseSipHashBuilder {
    fn default() -> Self {
        Self::from_process_seed()
    }
}

impl BuildHasher for NocaseSipHashBuilder {
    type Hasher = NocaseSipHasher;

    fn build_hasher(&self) -> Self::Hasher {
        NocaseSipHasher(SipHasher13::new_with_keys(self.k0, self.k1))
    }
}

impl Hasher for NocaseSipHasher {
    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0.write_u8(b.to_ascii_lowercase());
        }
    }

    fn finish(&self) -> u64 {
        self.0.finish()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_keys_same_hash() {
        let a = SipHashBuilder::with_keys(1, 2);
        let b = SipHashBuilder::with_keys(1, 2);

        let mut ha = a.build_hasher();
        let mut hb = b.build_hasher();

        ha.write(b"payload");
        hb.write(b"payload");

        assert_eq!(ha.finish(), hb.finish());
    }

    #[test]
    fn test_different_keys_different_hash() {
        let mut ha = SipHashBuilder::with_keys(1, 2).build_hasher();
        let mut hb = SipHashBuilder::with_keys(3, 4).build_hasher();

        ha.write(b"payload");
        hb.write(b"payload");

        assert_ne!(ha.finish(), hb.finish());
    }

    #[test]
    fn test_nocase_folds_ascii_case() {
        let builder = NocaseSipHashBuilder::with_keys(7, 8);

        let mut ha = builder.build_hasher();
        let mut hb = builder.build_hasher();

        ha.write(b"Hello World");
        hb.write(b"hello world");

        assert_eq!(ha.finish(), hb.finish());
    }

    #[test]
    fn test_nocase_still_distinguishes_content() {
        let builder = NocaseSipHashBuilder::with_keys(7, 8);

        let mut ha = builder.build_hasher();
        let mut hb = builder.build_hasher();

        ha.write(b"alpha");
        hb.write(b"omega");

        assert_ne!(ha.finish(), hb.finish());
    }

    #[test]
    fn test_process_seed_is_stable() {
        let (k0, k1) = hash_seed();

        assert_eq!(hash_seed(), (k0, k1));
        assert_eq!(gen_hash(b"x"), gen_hash(b"x"));
        assert_eq!(gen_case_hash(b"X"), gen_case_hash(b"x"));

        // после первого обращения seed менять нельзя
        assert!(!set_hash_seed(k0.wrapping_add(1), k1));
    }
}
