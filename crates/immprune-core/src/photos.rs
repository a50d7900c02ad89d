use std::io::ErrorKind;
use std::process::Command;

use serde::Deserialize;

use crate::asset::LocalAsset;
use crate::error::ImmpruneError;
use crate::key;

/// How the local Photos library is queried.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LocalSource {
    /// Photos scripting through `osascript` (JavaScript for Automation)
    #[default]
    Automation,
    /// The `osxphotos` command-line tool
    Osxphotos,
}

impl LocalSource {
    /// Program and arguments for this source. Only `osxphotos` can filter videos itself.
    pub fn command(self, only_videos: bool) -> (&'static str, Vec<&'static str>) {
        match self {
            LocalSource::Automation => ("osascript", vec!["-l", "JavaScript", "-e", PHOTOS_JXA_SCRIPT]),
            LocalSource::Osxphotos => {
                let mut args = vec!["query", "--json"];
                if only_videos {
                    args.push("--only-movies");
                }
                ("osxphotos", args)
            }
        }
    }
}

/// Lists every media item of Photos.app as a JSON array on stdout.
const PHOTOS_JXA_SCRIPT: &str = r#"
const photos = Application("Photos");

function attempt(fn, fallback) {
	try {
		const value = fn();
		return value === undefined || value === null ? fallback : value;
	} catch (e) {
		return fallback;
	}
}

const items = photos.mediaItems();
const out = [];
for (let i = 0; i < items.length; i++) {
	const item = items[i];
	const kind = String(attempt(() => item.mediaType(), "")).toLowerCase();
	const taken = attempt(() => item.date(), null);
	out.push({
		uuid: String(attempt(() => item.id(), "")),
		original_filename: String(attempt(() => item.filename(), "")),
		original_filesize: 0,
		date: taken ? new Date(taken).toISOString() : "",
		ismovie: kind.indexOf("video") >= 0,
		path: ""
	});
}
JSON.stringify(out);
"#;

#[derive(Debug, Deserialize)]
struct RawLocalAsset {
    #[serde(default)]
    uuid: String,
    #[serde(default)]
    original_filename: Option<String>,
    #[serde(default)]
    original_filesize: Option<u64>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    ismovie: bool,
    #[serde(default)]
    path: Option<String>,
}

/// Parse the JSON array emitted by either source. Malformed output is an error, never a
/// silently empty library.
pub fn parse_inventory(json: &[u8], only_videos: bool) -> Result<Vec<LocalAsset>, ImmpruneError> {
    let raw: Vec<RawLocalAsset> = serde_json::from_slice(json).map_err(|e| ImmpruneError::Parse {
        source_name: "Photos",
        message: e.to_string(),
    })?;

    let assets = raw
        .into_iter()
        .filter(|r| !only_videos || r.ismovie)
        .map(|r| LocalAsset {
            id: r.uuid,
            filename: key::normalize_name(r.original_filename.as_deref().unwrap_or("")),
            size: r.original_filesize.unwrap_or(0),
            date: r.date.as_deref().and_then(key::parse_timestamp),
            is_video: r.ismovie,
            path: r.path.filter(|p| !p.is_empty()),
        })
        .collect();
    Ok(assets)
}

/// Anything that can produce the local inventory.
pub trait InventorySource {
    fn read_assets(&self, only_videos: bool) -> anyhow::Result<Vec<LocalAsset>>;
}

/// The macOS Photos library, read through an external process.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhotosLibrary {
    pub source: LocalSource,
}

impl PhotosLibrary {
    pub fn new(source: LocalSource) -> Self {
        Self { source }
    }
}

impl InventorySource for PhotosLibrary {
    fn read_assets(&self, only_videos: bool) -> anyhow::Result<Vec<LocalAsset>> {
        if !cfg!(target_os = "macos") {
            return Err(ImmpruneError::Platform("macOS only for now".to_string()).into());
        }

        let (program, args) = self.source.command(only_videos);
        log::debug!("running {} ({:?} source)", program, self.source);

        let output = Command::new(program).args(&args).output().map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                ImmpruneError::ToolNotInstalled(program.to_string())
            } else {
                ImmpruneError::Platform(format!("cannot start {}: {}", program, e))
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let err = match self.source {
                LocalSource::Automation => ImmpruneError::AutomationDenied(stderr),
                LocalSource::Osxphotos => {
                    ImmpruneError::Platform(format!("{} failed ({}): {}", program, output.status, stderr))
                }
            };
            return Err(err.into());
        }

        let assets = parse_inventory(&output.stdout, only_videos)?;
        log::info!("read {} local assets", assets.len());
        Ok(assets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {"uuid":"A1","original_filename":"IMG_0001.HEIC","original_filesize":2048,"date":"2021-05-01T12:00:00+02:00","ismovie":false,"path":"/Pictures/IMG_0001.HEIC"},
        {"uuid":"B2","original_filename":"Clip.MOV","original_filesize":0,"date":"","ismovie":true,"path":""},
        {"uuid":"C3","original_filename":null,"original_filesize":null,"date":null,"ismovie":false,"path":null}
    ]"#;

    #[test]
    fn test_parse_normalizes_records() {
        let assets = parse_inventory(SAMPLE.as_bytes(), false).unwrap();
        assert_eq!(assets.len(), 3);

        assert_eq!(assets[0].id, "A1");
        assert_eq!(assets[0].filename, "img_0001.heic");
        assert_eq!(assets[0].size, 2048);
        assert_eq!(key::key_date(assets[0].date), "2021-05-01 10:00:00");
        assert_eq!(assets[0].path.as_deref(), Some("/Pictures/IMG_0001.HEIC"));

        assert!(assets[1].is_video);
        assert!(assets[1].date.is_none());
        assert!(assets[1].path.is_none());

        assert_eq!(assets[2].filename, "");
        assert_eq!(assets[2].size, 0);
    }

    #[test]
    fn test_videos_only_post_filter() {
        let assets = parse_inventory(SAMPLE.as_bytes(), true).unwrap();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].id, "B2");
    }

    #[test]
    fn test_malformed_output_fails() {
        let err = parse_inventory(b"execution error: Not authorized", false).unwrap_err();
        assert!(matches!(err, ImmpruneError::Parse { source_name: "Photos", .. }));
    }

    #[test]
    fn test_native_video_filter_only_for_osxphotos() {
        let (program, args) = LocalSource::Osxphotos.command(true);
        assert_eq!(program, "osxphotos");
        assert_eq!(args, vec!["query", "--json", "--only-movies"]);

        let (program, args) = LocalSource::Automation.command(true);
        assert_eq!(program, "osascript");
        assert!(!args.contains(&"--only-movies"));
    }

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn test_unsupported_platform() {
        let err = PhotosLibrary::default().read_assets(false).unwrap_err();
        assert!(matches!(err.downcast_ref::<ImmpruneError>(), Some(ImmpruneError::Platform(_))));
    }
}
