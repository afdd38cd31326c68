//! Sds — динамическая бинарно-безопасная байтовая строка.
//!
//! Представление двухклассовое: короткие строки лежат прямо в структуре
//! (`Inline`), длинные — в куче (`Heap`). Граница классов — `INLINE_CAP`;
//! её пересечение требует реаллокации с переносом содержимого, а не
//! простого изменения длины. Рост ёмкости амортизирован: требуемая
//! ёмкость удваивается, пока не достигнет `MAX_PREALLOC` (1 МиБ), дальше
//! строка растёт линейно, по `MAX_PREALLOC` за раз.

use std::{
    cmp::Ordering,
    convert::TryFrom,
    fmt::{self, Display},
    hash::{Hash, Hasher},
    ops::{Deref, DerefMut},
    str::{from_utf8, Utf8Error},
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone)]
enum Repr {
    Inline { len: u8, buf: [u8; Sds::INLINE_CAP] },
    Heap { buf: Vec<u8> },
}

#[derive(Debug, Clone)]
pub struct Sds(Repr);

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl Sds {
    /// Максимальная длина строки, умещающейся без аллокации.
    pub const INLINE_CAP: usize = std::mem::size_of::<usize>() * 3 - 1;

    /// Порог, после которого ёмкость растёт линейно, а не удвоением.
    pub const MAX_PREALLOC: usize = 1024 * 1024;

    /// Создаёт `Sds` из вектора байт, забирая буфер без копирования,
    /// если строка не помещается в inline-класс.
    #[inline]
    pub fn from_vec(vec: Vec<u8>) -> Self {
        if vec.len() <= Self::INLINE_CAP {
            Self::from_bytes(&vec)
        } else {
            Sds(Repr::Heap { buf: vec })
        }
    }

    /// Создаёт `Sds` копированием байтов среза.
    #[inline]
    pub fn from_bytes<B: AsRef<[u8]>>(bytes: B) -> Self {
        let slice = bytes.as_ref();

        if slice.len() <= Self::INLINE_CAP {
            let mut buf = [0u8; Self::INLINE_CAP];

            buf[..slice.len()].copy_from_slice(slice);

            Sds(Repr::Inline {
                len: slice.len() as u8,
                buf,
            })
        } else {
            Sds(Repr::Heap {
                buf: slice.to_vec(),
            })
        }
    }

    /// Создаёт `Sds` из `&str`.
    #[allow(clippy::should_implement_trait)]
    #[inline]
    pub fn from_str(s: &str) -> Self {
        Self::from_bytes(s.as_bytes())
    }

    #[inline]
    pub fn from_string(s: String) -> Self {
        Self::from_vec(s.into_bytes())
    }

    /// Возвращает содержимое как срез байт.
    #[inline(always)]
    pub fn as_slice(&self) -> &[u8] {
        match &self.0 {
            Repr::Inline { len, buf } => &buf[..*len as usize],
            Repr::Heap { buf } => buf.as_slice(),
        }
    }

    /// Псевдоним для [`as_slice`](Sds::as_slice).
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.as_slice()
    }

    /// Возвращает изменяемый срез текущего содержимого.
    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        match &mut self.0 {
            Repr::Inline { len, buf } => &mut buf[..*len as usize],
            Repr::Heap { buf } => buf.as_mut_slice(),
        }
    }

    /// Текущая длина в байтах.
    #[inline]
    pub fn len(&self) -> usize {
        match &self.0 {
            Repr::Inline { len, .. } => *len as usize,
            Repr::Heap { buf } => buf.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Текущая ёмкость буфера.
    #[inline]
    pub fn capacity(&self) -> usize {
        match &self.0 {
            Repr::Inline { .. } => Self::INLINE_CAP,
            Repr::Heap { buf } => buf.capacity(),
        }
    }

    /// Свободная ёмкость: сколько байт можно дописать без реаллокации.
    #[inline]
    pub fn avail(&self) -> usize {
        self.capacity() - self.len()
    }

    /// Возвращает `true`, если строка хранится без аллокации (inline).
    #[inline]
    pub fn is_inline(&self) -> bool {
        matches!(self.0, Repr::Inline { .. })
    }

    /// Целевая ёмкость для требуемой длины `required`: удвоение до
    /// `MAX_PREALLOC`, затем линейный шаг.
    #[inline]
    fn grow_capacity(required: usize) -> usize {
        if required < Self::MAX_PREALLOC {
            required * 2
        } else {
            required + Self::MAX_PREALLOC
        }
    }

    /// Гарантирует свободную ёмкость под `additional` байт.
    ///
    /// Выход за `INLINE_CAP` переводит строку в heap-класс: это всегда
    /// реаллокация с переносом содержимого, сменить «заголовок» на месте
    /// нельзя.
    fn make_room(&mut self, additional: usize) {
        let required = self.len() + additional;

        match &mut self.0 {
            Repr::Inline { .. } if required <= Self::INLINE_CAP => {}
            Repr::Inline { len, buf } => {
                let mut vec = Vec::with_capacity(Self::grow_capacity(required));

                vec.extend_from_slice(&buf[..*len as usize]);

                self.0 = Repr::Heap { buf: vec };
            }
            Repr::Heap { buf } => {
                if buf.capacity() < required {
                    let target = Self::grow_capacity(required);
                    buf.reserve_exact(target - buf.len());
                }
            }
        }
    }

    /// Резервирует место под как минимум `additional` дополнительных
    /// байт согласно политике роста.
    pub fn reserve(&mut self, additional: usize) {
        self.make_room(additional);
    }

    /// Добавляет один байт в конец.
    #[inline]
    pub fn push(&mut self, byte: u8) {
        self.make_room(1);

        match &mut self.0 {
            Repr::Inline { len, buf } => {
                buf[*len as usize] = byte;
                *len += 1;
            }
            Repr::Heap { buf } => buf.push(byte),
        }
    }

    /// Дописывает байты в конец строки.
    ///
    /// Содержимое после вызова равно конкатенации прежнего содержимого
    /// и `other`; ёмкость при дописывании никогда не уменьшается.
    pub fn append(&mut self, other: &[u8]) {
        if other.is_empty() {
            return;
        }

        self.make_room(other.len());

        match &mut self.0 {
            Repr::Inline { len, buf } => {
                let cur = *len as usize;

                buf[cur..cur + other.len()].copy_from_slice(other);
                *len = (cur + other.len()) as u8;
            }
            Repr::Heap { buf } => buf.extend_from_slice(other),
        }
    }

    /// Побайтовое лексикографическое сравнение; при равном префиксе
    /// короче — «меньше».
    #[inline]
    pub fn compare(&self, other: &Sds) -> Ordering {
        self.as_slice().cmp(other.as_slice())
    }

    /// Очищает содержимое, сохраняя аллокацию.
    pub fn clear(&mut self) {
        match &mut self.0 {
            Repr::Inline { len, .. } => *len = 0,
            Repr::Heap { buf } => buf.clear(),
        }
    }

    /// Обрезает строку до `new_len` байт (no-op, если она короче).
    pub fn truncate(&mut self, new_len: usize) {
        match &mut self.0 {
            Repr::Inline { len, .. } => {
                if new_len < *len as usize {
                    *len = new_len as u8;
                }
            }
            Repr::Heap { buf } => {
                if new_len < buf.len() {
                    buf.truncate(new_len);
                }
            }
        }

        self.inline_downgrade();
    }

    /// Срезает начальные и конечные байты, входящие в `charset`.
    pub fn trim(&mut self, charset: &[u8]) {
        let slice = self.as_slice();
        let start = slice
            .iter()
            .position(|b| !charset.contains(b))
            .unwrap_or(slice.len());
        let end = slice
            .iter()
            .rposition(|b| !charset.contains(b))
            .map_or(start, |p| p + 1);

        self.retain_window(start, end);
    }

    /// Оставляет только диапазон `[start, end]` (включительно) в стиле
    /// Python: отрицательные индексы считаются от конца, выход за
    /// границы зажимается, пустой диапазон очищает строку.
    pub fn range(&mut self, start: isize, end: isize) {
        let len = self.len() as isize;

        if len == 0 {
            return;
        }

        let start = if start < 0 { (len + start).max(0) } else { start };
        let mut end = if end < 0 { (len + end).max(0) } else { end };

        if end >= len {
            end = len - 1;
        }

        if start > end || start >= len {
            self.retain_window(0, 0);
            return;
        }

        self.retain_window(start as usize, end as usize + 1);
    }

    /// Приводит содержимое к нижнему ASCII-регистру на месте.
    pub fn to_lower(&mut self) {
        self.as_mut_slice().make_ascii_lowercase();
    }

    /// Приводит содержимое к верхнему ASCII-регистру на месте.
    pub fn to_upper(&mut self) {
        self.as_mut_slice().make_ascii_uppercase();
    }

    /// Возвращает копию подстроки в диапазоне `[start, end)`.
    pub fn slice_range(&self, start: usize, end: usize) -> Self {
        assert!(
            start <= end && end <= self.len(),
            "Sds::slice_range: invalid range [{start}, {end}) for len {}",
            self.len()
        );

        Self::from_bytes(&self.as_slice()[start..end])
    }

    /// Преобразует содержимое в `&str`, если оно валидно как UTF-8.
    #[inline]
    pub fn as_str(&self) -> Result<&str, Utf8Error> {
        from_utf8(self.as_slice())
    }

    /// Сдвигает окно `[start, end)` в начало буфера и отбрасывает хвост.
    fn retain_window(&mut self, start: usize, end: usize) {
        debug_assert!(start <= end && end <= self.len());

        match &mut self.0 {
            Repr::Inline { len, buf } => {
                buf.copy_within(start..end, 0);
                *len = (end - start) as u8;
            }
            Repr::Heap { buf } => {
                buf.copy_within(start..end, 0);
                buf.truncate(end - start);
            }
        }

        self.inline_downgrade();
    }

    /// Возвращает heap-строку в inline-класс, если длина позволяет.
    fn inline_downgrade(&mut self) {
        if let Repr::Heap { buf } = &self.0 {
            if buf.len() <= Self::INLINE_CAP {
                let len = buf.len();
                let mut inline_buf = [0u8; Self::INLINE_CAP];

                inline_buf[..len].copy_from_slice(&buf[..len]);

                self.0 = Repr::Inline {
                    len: len as u8,
                    buf: inline_buf,
                }
            }
        }
    }

    /// Проверяет внутренние инварианты структуры.
    #[cfg(debug_assertions)]
    pub fn debug_assert_invariants(&self) {
        match &self.0 {
            Repr::Inline { len, buf } => {
                assert!(
                    (*len as usize) <= Self::INLINE_CAP,
                    "Sds invariant violation: Inline len ({}) > INLINE_CAP ({})",
                    len,
                    Self::INLINE_CAP
                );
                let _ = &buf[..*len as usize];
            }
            Repr::Heap { buf } => {
                assert!(
                    buf.len() <= buf.capacity(),
                    "Sds invariant violation: Heap buf.len() ({}) > buf.capacity() ({})",
                    buf.len(),
                    buf.capacity()
                );
            }
        }
    }

    /// No-op в release-сборке.
    #[cfg(not(debug_assertions))]
    #[inline(always)]
    pub fn debug_assert_invariants(&self) {}
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для Sds
////////////////////////////////////////////////////////////////////////////////

impl Default for Sds {
    fn default() -> Self {
        Sds(Repr::Inline {
            len: 0,
            buf: [0u8; Sds::INLINE_CAP],
        })
    }
}

impl Deref for Sds {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl DerefMut for Sds {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_slice()
    }
}

impl Display for Sds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Ok(s) => write!(f, "{s}"),
            Err(_) => write!(f, "{:?}", self.as_slice()),
        }
    }
}

impl Hash for Sds {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl PartialEq for Sds {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for Sds {}

impl PartialOrd for Sds {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Sds {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl TryFrom<Sds> for String {
    type Error = Utf8Error;

    fn try_from(value: Sds) -> Result<Self, Self::Error> {
        value.as_str().map(|s| s.to_string())
    }
}

impl From<&[u8]> for Sds {
    fn from(slice: &[u8]) -> Self {
        Sds::from_bytes(slice)
    }
}

impl From<Vec<u8>> for Sds {
    fn from(v: Vec<u8>) -> Self {
        Sds::from_vec(v)
    }
}

impl From<Sds> for Vec<u8> {
    fn from(s: Sds) -> Self {
        match s.0 {
            Repr::Inline { len, buf } => buf[..len as usize].to_vec(),
            Repr::Heap { buf } => buf,
        }
    }
}

impl From<&str> for Sds {
    fn from(s: &str) -> Self {
        Sds::from_str(s)
    }
}

impl From<String> for Sds {
    #[inline]
    fn from(s: String) -> Self {
        Sds::from_string(s)
    }
}

impl std::str::FromStr for Sds {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Sds::from_str(s))
    }
}

impl Serialize for Sds {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(self.as_slice())
    }
}

impl<'de> Deserialize<'de> for Sds {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bytes = <Vec<u8>>::deserialize(deserializer)?;
        Ok(Sds::from_vec(bytes))
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_creation() {
        let s = Sds::from_str("hello");

        assert_eq!(s.len(), 5);
        assert_eq!(s.as_slice(), b"hello");
        assert!(s.is_inline());

        s.debug_assert_invariants();
    }

    #[test]
    fn test_heap_creation() {
        let long = "this is a long string exceeding the inline cap";
        let s = Sds::from_str(long);

        assert_eq!(s.len(), long.len());
        assert_eq!(s.as_slice(), long.as_bytes());
        assert!(!s.is_inline());

        s.debug_assert_invariants();
    }

    #[test]
    fn test_binary_safe_content() {
        let s = Sds::from_bytes([0u8, 159, 0, 42]);

        assert_eq!(s.len(), 4);
        assert_eq!(s.as_slice(), &[0, 159, 0, 42]);
    }

    #[test]
    fn test_append_concatenates() {
        let mut s = Sds::default();

        s.append(b"hello");
        s.append(b", world");

        assert_eq!(s.as_slice(), b"hello, world");
        assert_eq!(s.len(), 12);

        s.debug_assert_invariants();
    }

    #[test]
    fn test_append_crossing_inline_boundary() {
        let mut s = Sds::from_str(&"a".repeat(Sds::INLINE_CAP));

        assert!(s.is_inline());

        s.append(b"b");

        assert!(!s.is_inline());
        assert_eq!(s.len(), Sds::INLINE_CAP + 1);
        assert_eq!(s.as_slice()[Sds::INLINE_CAP], b'b');

        s.debug_assert_invariants();
    }

    #[test]
    fn test_growth_doubles_below_prealloc_threshold() {
        let mut s = Sds::from_str(&"x".repeat(Sds::INLINE_CAP + 1));
        let required = s.len() + 100;

        s.reserve(100);

        // ниже порога ёмкость удваивается от требуемой длины
        assert!(s.capacity() >= required * 2);
        assert_eq!(s.len(), Sds::INLINE_CAP + 1);

        s.debug_assert_invariants();
    }

    #[test]
    fn test_growth_linear_above_prealloc_threshold() {
        let mut s = Sds::from_vec(vec![b'x'; Sds::MAX_PREALLOC]);

        s.reserve(1);

        let cap = s.capacity();

        assert!(cap >= Sds::MAX_PREALLOC + 1);
        // линейный шаг: не более required + MAX_PREALLOC (плюс округление
        // аллокатора)
        assert!(cap <= (Sds::MAX_PREALLOC + 1) * 2);

        s.debug_assert_invariants();
    }

    #[test]
    fn test_capacity_never_shrinks_on_append() {
        let mut s = Sds::from_str(&"y".repeat(Sds::INLINE_CAP + 10));
        let mut prev_cap = s.capacity();

        for _ in 0..200 {
            s.append(b"abc");
            assert!(s.capacity() >= prev_cap);
            assert!(s.capacity() >= s.len());
            prev_cap = s.capacity();
        }
    }

    #[test]
    fn test_compare_lexicographic_and_length() {
        let a = Sds::from_str("abc");
        let b = Sds::from_str("abd");
        let prefix = Sds::from_str("ab");

        assert_eq!(a.compare(&b), Ordering::Less);
        assert_eq!(b.compare(&a), Ordering::Greater);
        assert_eq!(a.compare(&a.clone()), Ordering::Equal);
        // общий префикс: короче — меньше
        assert_eq!(prefix.compare(&a), Ordering::Less);
    }

    #[test]
    fn test_trim_strips_charset() {
        let mut s = Sds::from_str("  xxhelloxx  ");

        s.trim(b" x");

        assert_eq!(s.as_slice(), b"hello");

        s.debug_assert_invariants();
    }

    #[test]
    fn test_trim_to_empty() {
        let mut s = Sds::from_str("aaaa");

        s.trim(b"a");

        assert!(s.is_empty());
    }

    #[test]
    fn test_trim_noop_when_charset_absent() {
        let mut s = Sds::from_str("hello");

        s.trim(b"xyz");

        assert_eq!(s.as_slice(), b"hello");
    }

    #[test]
    fn test_range_positive() {
        let mut s = Sds::from_str("hello, world");

        s.range(7, 11);

        assert_eq!(s.as_slice(), b"world");
    }

    #[test]
    fn test_range_negative_indexes() {
        let mut s = Sds::from_str("hello, world");

        s.range(-5, -1);

        assert_eq!(s.as_slice(), b"world");
    }

    #[test]
    fn test_range_clamps_out_of_bounds() {
        let mut s = Sds::from_str("abc");

        s.range(0, 100);

        assert_eq!(s.as_slice(), b"abc");
    }

    #[test]
    fn test_range_inverted_clears() {
        let mut s = Sds::from_str("abc");

        s.range(2, 1);

        assert!(s.is_empty());
    }

    #[test]
    fn test_range_heap_shrinks_to_inline() {
        let mut s = Sds::from_str(&"z".repeat(Sds::INLINE_CAP + 20));

        assert!(!s.is_inline());

        s.range(0, 3);

        assert_eq!(s.len(), 4);
        assert!(s.is_inline());
    }

    #[test]
    fn test_case_conversion() {
        let mut s = Sds::from_str("Hello, World! 123");

        s.to_upper();
        assert_eq!(s.as_slice(), b"HELLO, WORLD! 123");

        s.to_lower();
        assert_eq!(s.as_slice(), b"hello, world! 123");
    }

    #[test]
    fn test_truncate_to_inline() {
        let mut s = Sds::from_str(&"a".repeat(Sds::INLINE_CAP + 5));

        assert!(!s.is_inline());

        s.truncate(5);

        assert!(s.is_inline());
        assert_eq!(s.len(), 5);

        s.debug_assert_invariants();
    }

    #[test]
    fn test_truncate_noop_when_longer() {
        let mut s = Sds::from_str("hello");

        s.truncate(100);

        assert_eq!(s.as_slice(), b"hello");
    }

    #[test]
    fn test_clear_preserves_heap_capacity() {
        let mut s = Sds::from_str(&"a".repeat(Sds::INLINE_CAP + 10));
        let cap = s.capacity();

        s.clear();

        assert!(s.is_empty());
        assert_eq!(s.capacity(), cap);
    }

    #[test]
    fn test_avail_matches_capacity_minus_len() {
        let mut s = Sds::from_str("abc");

        assert_eq!(s.avail(), Sds::INLINE_CAP - 3);

        s.reserve(100);

        assert_eq!(s.avail(), s.capacity() - s.len());
    }

    #[test]
    fn test_push_many_keeps_invariants() {
        let mut s = Sds::default();

        for i in 0u8..=200 {
            s.push(i);
            s.debug_assert_invariants();
        }

        assert_eq!(s.len(), 201);
        assert_eq!(s.as_slice()[200], 200);
    }

    #[test]
    fn test_slice_range_copy() {
        let s = Sds::from_str("abcdefg");

        assert_eq!(s.slice_range(2, 5).as_slice(), b"cde");
        assert!(s.slice_range(0, 0).is_empty());
    }

    #[test]
    fn test_equality_ordering_hash() {
        use std::hash::DefaultHasher;

        let a = Sds::from_str("foo");
        let b = Sds::from_str("foo");
        let c = Sds::from_str("zzz");

        assert_eq!(a, b);
        assert!(a < c);

        let mut ha = DefaultHasher::new();
        let mut hb = DefaultHasher::new();

        a.hash(&mut ha);
        b.hash(&mut hb);

        assert_eq!(ha.finish(), hb.finish());
    }

    #[test]
    fn test_display_and_utf8() {
        let s = Sds::from_str("test");

        assert_eq!(format!("{s}"), "test");
        assert!(Sds::from_vec(vec![0x80, 0x80]).as_str().is_err());
    }

    #[test]
    fn test_serde_roundtrip() {
        let s = Sds::from_bytes([1u8, 2, 0, 255]);
        let json = serde_json::to_string(&s).unwrap();
        let restored: Sds = serde_json::from_str(&json).unwrap();

        assert_eq!(s, restored);
    }

    #[test]
    fn test_conversions() {
        let s: Sds = String::from("hi").into();
        assert!(s.is_inline());

        let v: Vec<u8> = s.into();
        assert_eq!(v, b"hi");

        let s2: Sds = b"raw bytes"[..].into();
        assert_eq!(s2.as_slice(), b"raw bytes");
    }
}
