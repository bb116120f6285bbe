use std::time::Duration;

use cardpin_core::testutil::MemoryPinner;
use cardpin_core::{BatchDriver, CardKey, DictionaryStore, DriverConfig};
use cardpin_source_local::ImageFolderSource;
use tempfile::tempdir;

fn config() -> DriverConfig {
    DriverConfig {
        delay: Duration::ZERO,
        save_every: 1,
    }
}

#[tokio::test]
async fn pins_folder_then_resumes_without_calls() {
    let dir = tempdir().unwrap();
    let images = dir.path().join("images");
    std::fs::create_dir(&images).unwrap();
    std::fs::write(images.join("100.jpg"), b"front of 100").unwrap();
    std::fs::write(images.join("205.png"), b"front of 205").unwrap();
    std::fs::write(images.join("readme.txt"), b"not a card").unwrap();

    let dictionary = dir.path().join("images.json");
    let source = ImageFolderSource::new(&images, "alpha");

    let mut driver = BatchDriver::new(MemoryPinner::new(), DictionaryStore::new(&dictionary))
        .with_config(config());
    let report = driver.run(&source).await.unwrap();

    assert_eq!(report.discovered, 2);
    assert_eq!(report.pinned, 2);
    assert_eq!(driver.pinner().pinned_labels(), ["alpha_100", "alpha_205"]);

    let expected = format!(
        r#"{{"100":"ipfs://{}","205":"ipfs://{}"}}"#,
        MemoryPinner::hash_for(b"front of 100"),
        MemoryPinner::hash_for(b"front of 205"),
    );
    assert_eq!(std::fs::read_to_string(&dictionary).unwrap(), expected);

    let mut driver = BatchDriver::new(MemoryPinner::new(), DictionaryStore::new(&dictionary))
        .with_config(config());
    let report = driver.run(&source).await.unwrap();

    assert_eq!(driver.pinner().calls(), 0);
    assert_eq!(report.already_pinned, 2);
    assert_eq!(std::fs::read_to_string(&dictionary).unwrap(), expected);
}

#[tokio::test]
async fn new_images_are_picked_up_on_the_next_run() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("1.jpg"), b"one").unwrap();
    let dictionary = DictionaryStore::new(dir.path().join("dict").join("images.json"));
    let source = ImageFolderSource::new(dir.path(), "alpha");

    let mut driver = BatchDriver::new(MemoryPinner::new(), dictionary.clone()).with_config(config());
    driver.run(&source).await.unwrap();

    std::fs::write(dir.path().join("2.jpg"), b"two").unwrap();
    let mut driver = BatchDriver::new(MemoryPinner::new(), dictionary.clone()).with_config(config());
    let report = driver.run(&source).await.unwrap();

    assert_eq!(report.pinned, 1);
    assert_eq!(driver.pinner().pinned_labels(), ["alpha_2"]);
    let mapping = dictionary.load().unwrap();
    assert!(mapping.contains(&CardKey::from(1)));
    assert!(mapping.contains(&CardKey::from(2)));
}

#[tokio::test]
async fn unreadable_image_is_retried_later() {
    let dir = tempdir().unwrap();
    let images = dir.path().join("images");
    std::fs::create_dir(&images).unwrap();
    std::fs::write(images.join("3.jpg"), b"three").unwrap();
    std::fs::write(images.join("4.jpg"), b"four").unwrap();

    let dictionary = DictionaryStore::new(dir.path().join("images.json"));
    let source = ImageFolderSource::new(&images, "alpha");

    let pinner = MemoryPinner::new();
    pinner.fail_label("alpha_3");
    let mut driver = BatchDriver::new(pinner, dictionary.clone()).with_config(config());
    let report = driver.run(&source).await.unwrap();
    assert_eq!((report.pinned, report.failed), (1, 1));

    let mut driver = BatchDriver::new(MemoryPinner::new(), dictionary.clone()).with_config(config());
    let report = driver.run(&source).await.unwrap();
    assert_eq!(driver.pinner().calls(), 1);
    assert_eq!((report.pinned, report.already_pinned), (1, 1));
    assert_eq!(dictionary.load().unwrap().len(), 2);
}
