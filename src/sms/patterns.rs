//! Rotating store of IPPanel pattern template codes.
//!
//! Holds the ordered list of pattern codes from config plus the mutable
//! current index. The index is the only mutable piece and every access is a
//! read-modify-write, so a plain mutex guards it.

use std::sync::Mutex;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("pattern index {index} out of range (list has {len} patterns)")]
    InvalidIndex { index: usize, len: usize },
}

/// The currently selected pattern, as shown to operators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternInfo {
    /// Template code registered with the gateway. Empty when nothing is configured.
    pub code: String,
    /// 1-based position in the list (0 for the sentinel).
    pub index: usize,
    /// Human label for the panel, derived from the position.
    pub group: String,
}

impl PatternInfo {
    /// Sentinel returned when the pattern list is empty.
    fn none_configured() -> Self {
        Self {
            code: String::new(),
            index: 0,
            group: "پترنی تنظیم نشده".to_string(),
        }
    }

    /// True when this is a real pattern rather than the sentinel.
    pub fn is_configured(&self) -> bool {
        !self.code.is_empty()
    }
}

/// One row of the pattern listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternEntry {
    /// 0-based position.
    pub index: usize,
    pub label: String,
    pub code: String,
    pub is_current: bool,
}

/// Ordered pattern codes with a circular current-index pointer.
pub struct PatternStore {
    codes: Vec<String>,
    index: Mutex<usize>,
}

impl PatternStore {
    pub fn new(codes: Vec<String>) -> Self {
        Self {
            codes,
            index: Mutex::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Returns the pattern at the current index.
    ///
    /// An out-of-range stored index is clamped back to 0 rather than
    /// panicking; the index can only drift if the config shrinks between
    /// restarts of an embedding test harness.
    pub fn current(&self) -> PatternInfo {
        if self.codes.is_empty() {
            return PatternInfo::none_configured();
        }

        let mut index = self.index.lock().unwrap_or_else(|e| e.into_inner());
        if *index >= self.codes.len() {
            *index = 0;
        }
        self.info_at(*index)
    }

    /// Advances the current index circularly, then returns the new current pattern.
    pub fn advance(&self) -> PatternInfo {
        if self.codes.is_empty() {
            return PatternInfo::none_configured();
        }

        let mut index = self.index.lock().unwrap_or_else(|e| e.into_inner());
        *index = (*index + 1) % self.codes.len();
        let info = self.info_at(*index);
        drop(index);

        log::info!(
            "🔄 Pattern advanced to {} ({} of {}): {}",
            info.group,
            info.index,
            self.codes.len(),
            info.code
        );
        info
    }

    /// Sets the current index explicitly.
    pub fn set_index(&self, i: usize) -> Result<PatternInfo, PatternError> {
        if i >= self.codes.len() {
            return Err(PatternError::InvalidIndex {
                index: i,
                len: self.codes.len(),
            });
        }

        let mut index = self.index.lock().unwrap_or_else(|e| e.into_inner());
        *index = i;
        Ok(self.info_at(*index))
    }

    /// Lists every pattern with its label and current-marker.
    pub fn list(&self) -> Vec<PatternEntry> {
        let current = {
            let index = self.index.lock().unwrap_or_else(|e| e.into_inner());
            *index
        };

        self.codes
            .iter()
            .enumerate()
            .map(|(i, code)| PatternEntry {
                index: i,
                label: group_label(i),
                code: code.clone(),
                is_current: i == current,
            })
            .collect()
    }

    fn info_at(&self, i: usize) -> PatternInfo {
        PatternInfo {
            code: self.codes[i].clone(),
            index: i + 1,
            group: group_label(i),
        }
    }
}

/// Group label derived from the 0-based index, so the list scales past four.
fn group_label(index: usize) -> String {
    format!("گروه {}", index + 1)
}
