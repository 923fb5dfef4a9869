/*!
 * Tests for file and directory utilities
 */

use anyhow::Result;
use std::fs;
use yahtwai::file_utils::FileManager;

use crate::common;

#[test]
fn test_ensureDir_shouldCreateNestedDirectories() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let nested = dir.path().join("fr").join("drafts");
    FileManager::ensure_dir(&nested)?;
    assert!(FileManager::dir_exists(&nested));
    // Calling twice is fine
    FileManager::ensure_dir(&nested)?;
    Ok(())
}

#[test]
fn test_fileSize_shouldReturnZeroForMissingFiles() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = common::create_test_file(dir.path(), "doc.html", "12345")?;
    assert_eq!(FileManager::file_size(&path), 5);
    assert_eq!(FileManager::file_size(dir.path().join("none.html")), 0);
    Ok(())
}

#[test]
fn test_findFiles_shouldMatchExtensionWithOrWithoutDot() -> Result<()> {
    let dir = common::create_temp_dir()?;
    common::create_test_file(dir.path(), "a.html", "x")?;
    common::create_test_file(dir.path(), "b.htm", "x")?;
    assert_eq!(FileManager::find_files(dir.path(), ".html")?.len(), 1);
    assert_eq!(FileManager::find_files(dir.path(), "html")?.len(), 1);
    Ok(())
}

#[test]
fn test_appendToLogFile_shouldPrefixTimestamp() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = dir.path().join("logs").join("page.txt");
    FileManager::append_to_log_file(&path, "request")?;
    FileManager::append_to_log_file(&path, "response")?;

    let content = fs::read_to_string(&path)?;
    let entries: Vec<&str> = content.split("\n\n\n").filter(|e| !e.is_empty()).collect();
    assert_eq!(entries.len(), 2);
    // HH:MM prefix
    assert_eq!(entries[0].find(' '), Some(5));
    assert!(entries[1].ends_with("response"));
    Ok(())
}

#[test]
fn test_removeIfExists_shouldIgnoreMissingFiles() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = common::create_test_file(dir.path(), "page.json", "{}")?;
    FileManager::remove_if_exists(&path)?;
    assert!(!FileManager::file_exists(&path));
    FileManager::remove_if_exists(&path)?;
    Ok(())
}
