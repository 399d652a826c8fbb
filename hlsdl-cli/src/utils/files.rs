use std::path::{Path, PathBuf};

pub const DEFAULT_OUTPUT: &str = "video.mp4";
const DEFAULT_EXTENSION: &str = "mp4";

/// Resolves the output file name: empty means [`DEFAULT_OUTPUT`], and a name
/// without an extension gets `.mp4`.
pub fn normalize_output_path(path: &Path) -> PathBuf {
    if path.as_os_str().is_empty() {
        return PathBuf::from(DEFAULT_OUTPUT);
    }
    if path.extension().is_some() {
        return path.to_path_buf();
    }
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(DEFAULT_EXTENSION);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_output_path() {
        assert_eq!(normalize_output_path(Path::new("")), PathBuf::from("video.mp4"));
        assert_eq!(normalize_output_path(Path::new("movie")), PathBuf::from("movie.mp4"));
        assert_eq!(normalize_output_path(Path::new("movie.mkv")), PathBuf::from("movie.mkv"));
        assert_eq!(
            normalize_output_path(Path::new("out/ep.1")),
            PathBuf::from("out/ep.1")
        );
        assert_eq!(
            normalize_output_path(Path::new("out/episode")),
            PathBuf::from("out/episode.mp4")
        );
    }
}
