//! Общие типы ошибок движка.
//!
//! Ошибки словаря (`DictError`) — это нарушения контракта операций
//! `expand`/`resize_to_fit`, а не исключительные ситуации: отсутствие
//! ключа и пустые диапазоны всегда выражаются через `Option`/`bool`.

use thiserror::Error;

pub type DictResult<T> = Result<T, DictError>;

/// Ошибки изменения размера словаря.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DictError {
    /// `expand`/`resize_to_fit` вызваны, пока идёт инкрементальное
    /// рехеширование: начатую миграцию нельзя ни отменить, ни вложить.
    #[error("expand requested while incremental rehash is in progress")]
    RehashInProgress,

    /// Запрошенная ёмкость меньше числа уже хранимых элементов.
    #[error("target capacity {target} is below the number of stored entries {used}")]
    TargetBelowUsed { target: usize, used: usize },

    /// Изменение размера выключено конфигурацией таблицы.
    #[error("resizing is disabled by the dict configuration")]
    ResizeDisabled,
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DictError::TargetBelowUsed {
            target: 4,
            used: 10,
        };

        assert!(err.to_string().contains("below the number"));
        assert_eq!(err, err);
    }
}
