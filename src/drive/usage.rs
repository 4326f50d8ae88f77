//! Storage usage summary.

use chrono::{DateTime, Utc};

use super::{FileRecord, FileType};
use crate::format::calculate_percentage;

/// Space taken by one file type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeUsage {
    pub size: u64,
    /// Most recent update among files of this type.
    pub latest_date: Option<DateTime<Utc>>,
}

/// Per-type and total storage use against the quota.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsageSummary {
    pub document: TypeUsage,
    pub image: TypeUsage,
    pub video: TypeUsage,
    pub audio: TypeUsage,
    pub other: TypeUsage,
    pub used: u64,
    /// Quota in bytes.
    pub all: u64,
    pub used_percentage: f64,
}

impl UsageSummary {
    /// Summarize `files` against a quota of `all` bytes.
    pub fn from_files<'a>(files: impl IntoIterator<Item = &'a FileRecord>, all: u64) -> Self {
        let mut summary = Self {
            all,
            ..Default::default()
        };

        for file in files {
            let usage = summary.type_mut(file.file_type);
            usage.size += file.size;
            if usage.latest_date.map_or(true, |latest| file.updated_at > latest) {
                usage.latest_date = Some(file.updated_at);
            }
            summary.used += file.size;
        }

        summary.used_percentage = calculate_percentage(summary.used, all);
        summary
    }

    pub fn get(&self, file_type: FileType) -> &TypeUsage {
        match file_type {
            FileType::Document => &self.document,
            FileType::Image => &self.image,
            FileType::Video => &self.video,
            FileType::Audio => &self.audio,
            FileType::Other => &self.other,
        }
    }

    fn type_mut(&mut self, file_type: FileType) -> &mut TypeUsage {
        match file_type {
            FileType::Document => &mut self.document,
            FileType::Image => &mut self.image,
            FileType::Video => &mut self.video,
            FileType::Audio => &mut self.audio,
            FileType::Other => &mut self.other,
        }
    }
}
