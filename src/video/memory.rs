use anyhow::{anyhow, Result};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::{FrameSink, FrameSource, Rotation};

/// メモリ上のフレーム列をそのまま流すソース
pub struct MemorySource<F> {
    frames: VecDeque<F>,
    fps: Option<f64>,
    rotation: Option<Rotation>,
}

impl<F> MemorySource<F> {
    pub fn new(frames: Vec<F>, fps: f64) -> Self {
        Self {
            frames: frames.into(),
            fps: Some(fps),
            rotation: None,
        }
    }

    /// fps 不明のコンテナを模す
    pub fn without_fps(mut self) -> Self {
        self.fps = None;
        self
    }

    pub fn with_rotation_hint(mut self, rotation: Rotation) -> Self {
        self.rotation = Some(rotation);
        self
    }
}

impl<F> FrameSource<F> for MemorySource<F> {
    fn fps(&self) -> Option<f64> {
        self.fps
    }

    fn rotation_hint(&self) -> Option<Rotation> {
        self.rotation
    }

    fn next_frame(&mut self) -> Result<Option<F>> {
        Ok(self.frames.pop_front())
    }
}

/// `MemorySink` が確定したフレームの置き場所
#[derive(Debug)]
pub struct FrameStore<F>(Arc<Mutex<Vec<F>>>);

impl<F> Clone for FrameStore<F> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<F> Default for FrameStore<F> {
    fn default() -> Self {
        Self(Arc::new(Mutex::new(Vec::new())))
    }
}

impl<F: Clone> FrameStore<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> Vec<F> {
        match self.0.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.frames().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 書き込みをためておき、`finish` で `FrameStore` に確定させるシンク
pub struct MemorySink<F> {
    pending: Vec<F>,
    store: FrameStore<F>,
}

impl<F> MemorySink<F> {
    pub fn new(store: &FrameStore<F>) -> Self {
        Self {
            pending: Vec::new(),
            store: store.clone(),
        }
    }
}

impl<F: Clone> FrameSink<F> for MemorySink<F> {
    fn write(&mut self, frame: &F) -> Result<()> {
        self.pending.push(frame.clone());
        Ok(())
    }

    fn finish(self) -> Result<()> {
        let mut frames = self
            .store
            .0
            .lock()
            .map_err(|_| anyhow!("frame store lock poisoned"))?;
        frames.extend(self.pending);
        Ok(())
    }

    fn discard(self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_yields_in_order() {
        let mut source = MemorySource::new(vec![1, 2, 3], 30.0);
        assert_eq!(source.fps(), Some(30.0));
        assert_eq!(source.next_frame().unwrap(), Some(1));
        assert_eq!(source.next_frame().unwrap(), Some(2));
        assert_eq!(source.next_frame().unwrap(), Some(3));
        assert_eq!(source.next_frame().unwrap(), None);
    }

    #[test]
    fn test_sink_commits_only_on_finish() {
        let store = FrameStore::new();
        let mut sink = MemorySink::new(&store);
        sink.write(&7).unwrap();
        assert!(store.is_empty());
        sink.finish().unwrap();
        assert_eq!(store.frames(), vec![7]);
    }

    #[test]
    fn test_sink_discard_drops_frames() {
        let store = FrameStore::new();
        let mut sink = MemorySink::new(&store);
        sink.write(&7).unwrap();
        sink.discard().unwrap();
        assert!(store.is_empty());
    }
}
