//! Write-completion heuristic
//!
//! A create event can fire while the writer is still filling the file. When
//! a settle window is configured, the file is only sent once its size stays
//! the same across one full window.

use std::io;
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tokio::time::sleep;

/// Waits until the size of `path` is unchanged across `window`, returning
/// that size. Fails if the file disappears meanwhile.
pub async fn wait_until_settled(path: &Path, window: Duration) -> io::Result<u64> {
    let mut last = fs::metadata(path).await?.len();
    loop {
        sleep(window).await;
        let current = fs::metadata(path).await?.len();
        if current == last {
            return Ok(current);
        }
        last = current;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_stable_file_settles() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, vec![0u8; 42]).unwrap();

        let size = wait_until_settled(&path, Duration::from_millis(10))
            .await
            .unwrap();
        assert_eq!(size, 42);
    }

    #[tokio::test]
    async fn test_waits_for_growing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("growing.bin");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(&[1u8; 10]).unwrap();

        let writer = tokio::spawn(async move {
            for _ in 0..3 {
                sleep(Duration::from_millis(20)).await;
                file.write_all(&[1u8; 10]).unwrap();
                file.flush().unwrap();
            }
        });

        let size = wait_until_settled(&path, Duration::from_millis(80))
            .await
            .unwrap();
        writer.await.unwrap();
        assert_eq!(size, 40);
    }

    #[tokio::test]
    async fn test_missing_file_fails() {
        let dir = tempdir().unwrap();
        let result = wait_until_settled(&dir.path().join("gone"), Duration::from_millis(5)).await;
        assert!(result.is_err());
    }
}
