// loader.rs: decode images off the UI thread, deliver once

use crate::error::{Result, ViewerError};
use image::io::Reader as ImageReader;
use image::RgbaImage;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::thread;

/// One in-flight decode. Dropping it cancels delivery: the worker's result is
/// discarded instead of reaching whoever started the load.
pub struct PendingLoad {
    path: PathBuf,
    rx: Receiver<Result<RgbaImage>>,
}

impl PendingLoad {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `None` while the decode is still running.
    pub fn poll(&self) -> Option<Result<RgbaImage>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(ViewerError::LoaderGone)),
        }
    }
}

pub fn spawn(path: PathBuf) -> PendingLoad {
    let (tx, rx) = channel();
    let worker_path = path.clone();

    thread::spawn(move || {
        log::info!("loading image in background: {:?}", worker_path);
        let result = decode(&worker_path);
        match &result {
            Ok(img) => log::info!(
                "decoded {:?} ({}x{})",
                worker_path,
                img.width(),
                img.height()
            ),
            Err(e) => log::error!("{}", e),
        }
        if tx.send(result).is_err() {
            log::debug!("load of {:?} finished after its owner went away", worker_path);
        }
    });

    PendingLoad { path, rx }
}

pub fn decode(path: &Path) -> Result<RgbaImage> {
    let file = File::open(path).map_err(|source| ViewerError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let img = ImageReader::new(BufReader::new(file))
        .with_guessed_format()
        .map_err(image::ImageError::IoError)
        .and_then(|mut r| {
            r.no_limits();
            r.decode()
        })
        .map_err(|source| ViewerError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(img.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::time::{Duration, Instant};

    fn wait(pending: &PendingLoad) -> Result<RgbaImage> {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let Some(r) = pending.poll() {
                return r;
            }
            assert!(Instant::now() < deadline, "loader timed out");
            thread::sleep(Duration::from_millis(5));
        }
    }

    fn temp_file(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("panomask-loader-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    #[test]
    fn delivers_decoded_rgba() {
        let path = temp_file("small.png");
        RgbaImage::from_pixel(6, 3, Rgba([1, 2, 3, 4])).save(&path).unwrap();

        let pending = spawn(path.clone());
        assert_eq!(pending.path(), path.as_path());
        let img = wait(&pending).unwrap();
        assert_eq!(img.dimensions(), (6, 3));
        assert_eq!(img.get_pixel(5, 2).0, [1, 2, 3, 4]);
    }

    #[test]
    fn missing_file_reports_open_error() {
        let pending = spawn(PathBuf::from("/no/such/dir/room.jpg"));
        assert!(matches!(wait(&pending), Err(ViewerError::Open { .. })));
    }

    #[test]
    fn garbage_reports_decode_error() {
        let path = temp_file("garbage.png");
        std::fs::write(&path, b"definitely not an image").unwrap();
        assert!(matches!(decode(&path), Err(ViewerError::Decode { .. })));
    }

    #[test]
    fn dropped_load_does_not_block_a_later_one() {
        let path = temp_file("dropped.png");
        RgbaImage::from_pixel(3, 2, Rgba([9, 8, 7, 255])).save(&path).unwrap();
        drop(spawn(path.clone()));

        let again = spawn(path);
        let img = wait(&again).unwrap();
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.get_pixel(0, 0).0, [9, 8, 7, 255]);
    }
}
