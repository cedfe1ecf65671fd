use crate::canvas::{Canvas, PixelBuffer};
use std::sync::{Arc, Mutex, MutexGuard};

/// Cloneable handle to the one canvas every front end draws into.
///
/// Each primitive runs under the lock, so the render loop never observes a
/// half-written pixel, though it may see a multi-pixel shape partially drawn
/// between two calls.
#[derive(Clone)]
pub struct SharedCanvas {
    inner: Arc<Mutex<Canvas>>,
}

impl SharedCanvas {
    pub fn new(canvas: Canvas) -> Self {
        Self {
            inner: Arc::new(Mutex::new(canvas)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Canvas> {
        // a panicking writer leaves at worst a partially drawn shape behind
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut Canvas) -> R) -> R {
        let mut canvas = self.lock();
        f(&mut canvas)
    }

    pub fn composite(&self) -> PixelBuffer {
        self.lock().composite()
    }

    pub fn size(&self) -> (u32, u32) {
        self.lock().size()
    }
}

impl std::fmt::Debug for SharedCanvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (width, height) = self.size();
        f.debug_struct("SharedCanvas")
            .field("width", &width)
            .field("height", &height)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use std::thread;
    use std::time::{Duration, Instant};

    #[test]
    fn concurrent_writers_all_land() {
        let shared = SharedCanvas::new(Canvas::new(16, 16).unwrap());
        let handles: Vec<_> = (0..16)
            .map(|row| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for x in 0..16 {
                        shared.with(|canvas| canvas.set_pixel(x, row, Color::RED));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let frame = shared.composite();
        assert!(frame.as_bytes().chunks_exact(4).all(|px| px == [255, 0, 0, 255]));
    }

    #[test]
    fn huge_shapes_release_the_lock_promptly() {
        let shared = SharedCanvas::new(Canvas::new(16, 16).unwrap());
        let writer = shared.clone();
        let started = Instant::now();
        let handle = thread::spawn(move || {
            for _ in 0..20 {
                writer.with(|c| c.draw_circle(5, 5, 200_000, 0, true, Color::RED));
                writer.with(|c| c.draw_line(i32::MIN, 0, i32::MAX, 1, 1, Color::RED));
            }
        });
        let frame = shared.composite();
        handle.join().unwrap();

        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(frame.width(), 16);
        assert!(shared
            .composite()
            .as_bytes()
            .chunks_exact(4)
            .all(|px| px == [255, 0, 0, 255]));
    }

    #[test]
    fn poisoned_lock_is_recovered() {
        let shared = SharedCanvas::new(Canvas::new(2, 2).unwrap());
        let clone = shared.clone();
        let _ = thread::spawn(move || {
            clone.with(|canvas| {
                canvas.set_pixel(0, 0, Color::RED);
                panic!("writer died");
            })
        })
        .join();

        assert_eq!(
            shared.with(|canvas| canvas.current_pixels().pixel(0, 0)),
            Some(Color::RED)
        );
    }
}
