use async_trait::async_trait;
use log::debug;

use super::dto::{DeviceError, Facing};

pub trait MediaTrack: Send + Sync {
    fn label(&self) -> String;

    /// Must tolerate being called on an already stopped track.
    fn stop(&self);
}

/// Owns the tracks of an acquired video stream. Dropping the stream stops
/// them, so a stream that never reaches the scanner still frees the camera.
pub struct MediaStream {
    tracks: Vec<Box<dyn MediaTrack>>,
}

impl MediaStream {
    pub fn new(tracks: Vec<Box<dyn MediaTrack>>) -> Self {
        Self { tracks }
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn release(&mut self) {
        for track in self.tracks.drain(..) {
            debug!("📷 Stopping media track {}", track.label());
            track.stop();
        }
    }
}

impl Drop for MediaStream {
    fn drop(&mut self) {
        self.release();
    }
}

#[async_trait]
pub trait Camera: Send + Sync {
    fn available(&self) -> bool;

    async fn acquire(&self, facing: Facing) -> Result<MediaStream, DeviceError>;
}

pub struct UnavailableCamera;

#[async_trait]
impl Camera for UnavailableCamera {
    fn available(&self) -> bool {
        false
    }

    async fn acquire(&self, _facing: Facing) -> Result<MediaStream, DeviceError> {
        Err(DeviceError::NotSupported)
    }
}

/// Holds at most one live stream for the scanner preview.
#[derive(Default)]
pub struct CameraScanner {
    stream: Option<MediaStream>,
}

impl CameraScanner {
    pub fn is_active(&self) -> bool {
        self.stream.is_some()
    }

    /// Takes ownership of `stream`; any stream already held is released first.
    pub fn attach(&mut self, stream: MediaStream) {
        self.release();
        self.stream = Some(stream);
    }

    /// Releases every track. Safe to call any number of times.
    pub fn release(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.release();
        }
    }
}

impl Drop for CameraScanner {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    struct CountingTrack {
        stops: Arc<AtomicUsize>,
    }

    impl MediaTrack for CountingTrack {
        fn label(&self) -> String {
            "test-track".to_string()
        }

        fn stop(&self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn stream_with(stops: &Arc<AtomicUsize>, count: usize) -> MediaStream {
        let tracks = (0..count)
            .map(|_| Box::new(CountingTrack { stops: stops.clone() }) as Box<dyn MediaTrack>)
            .collect();
        MediaStream::new(tracks)
    }

    #[test]
    fn test_release_is_idempotent() {
        let stops = Arc::new(AtomicUsize::new(0));
        let mut scanner = CameraScanner::default();

        scanner.attach(stream_with(&stops, 2));
        assert!(scanner.is_active());

        scanner.release();
        scanner.release();

        assert!(!scanner.is_active());
        assert_eq!(stops.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_attach_releases_previous_stream() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let mut scanner = CameraScanner::default();

        scanner.attach(stream_with(&first, 1));
        scanner.attach(stream_with(&second, 1));

        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);

        drop(scanner);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unattached_stream_releases_on_drop() {
        let stops = Arc::new(AtomicUsize::new(0));
        drop(stream_with(&stops, 3));
        assert_eq!(stops.load(Ordering::SeqCst), 3);
    }
}
