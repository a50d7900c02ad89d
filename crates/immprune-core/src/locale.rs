use std::fmt;

use crate::batch::YearBatch;

/// Language of the report and of console labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Locale {
    #[default]
    En,
    Fr,
}

impl Locale {
    pub fn report_title(self, count: usize) -> String {
        match self {
            Locale::En => format!("🛰️ immprune - {} files are safe to delete from iCloud Photos", count),
            Locale::Fr => format!(
                "🛰️ immprune - {} fichiers peuvent être supprimés d'iCloud Photos en toute sécurité",
                count
            ),
        }
    }

    pub fn scan_label(self) -> &'static str {
        match self {
            Locale::En => "Scan",
            Locale::Fr => "Analyse",
        }
    }

    pub fn batch_header(self, batch: YearBatch, count: usize) -> String {
        match self {
            Locale::En => format!("📦 Batch {} | {} candidates", batch, count),
            Locale::Fr => format!("📦 Lot {} | {} candidats", batch, count),
        }
    }

    pub fn kind(self, is_video: bool) -> &'static str {
        match (self, is_video) {
            (_, false) => "PHOTO",
            (Locale::En, true) => "VIDEO",
            (Locale::Fr, true) => "VIDÉO",
        }
    }

    pub fn scanning_remote(self) -> &'static str {
        match self {
            Locale::En => "🔭 Scanning Immich assets",
            Locale::Fr => "🔭 Analyse des fichiers Immich",
        }
    }

    pub fn scanning_remote_done(self) -> &'static str {
        match self {
            Locale::En => "Immich scan complete",
            Locale::Fr => "Analyse Immich terminée",
        }
    }

    pub fn reading_local(self) -> &'static str {
        match self {
            Locale::En => "🧩 Reading Apple Photos library",
            Locale::Fr => "🧩 Lecture de la photothèque Apple Photos",
        }
    }

    pub fn reading_local_done(self) -> &'static str {
        match self {
            Locale::En => "Apple Photos scan complete",
            Locale::Fr => "Lecture d'Apple Photos terminée",
        }
    }

    pub fn matching(self) -> &'static str {
        match self {
            Locale::En => "🧮 Matching",
            Locale::Fr => "🧮 Comparaison",
        }
    }

    pub fn output_ready(self, path: &str) -> String {
        match self {
            Locale::En => format!("🧾 Output file ready → {} (delete from top to bottom)", path),
            Locale::Fr => format!("🧾 Fichier prêt → {} (supprimer de haut en bas)", path),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Locale::En => "en",
            Locale::Fr => "fr",
        })
    }
}
