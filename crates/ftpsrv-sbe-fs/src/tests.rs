use super::*;
use pretty_assertions::assert_eq;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

#[test]
fn fs_strip_prefixes() {
    assert_eq!(strip_prefixes(Path::new("foo/bar")), Path::new("foo/bar"));
    assert_eq!(strip_prefixes(Path::new("/foo/bar")), Path::new("foo/bar"));
    assert_eq!(strip_prefixes(Path::new("/")), Path::new("."));
}

#[test]
fn fs_normalize_stays_inside_root() {
    assert_eq!(normalize(Path::new("/"), "../../etc/passwd"), PathBuf::from("/etc/passwd"));
    assert_eq!(normalize(Path::new("/a/b"), "../c"), PathBuf::from("/a/c"));
    assert_eq!(normalize(Path::new("/a/b"), "/x/./y"), PathBuf::from("/x/y"));
    assert_eq!(normalize(Path::new("/a"), "."), PathBuf::from("/a"));
}

#[tokio::test]
async fn fs_list() {
    let root = tempfile::tempdir().unwrap();
    std::fs::write(root.path().join("b.txt"), b"bee").unwrap();
    std::fs::write(root.path().join("a.txt"), b"a").unwrap();
    std::fs::create_dir(root.path().join("dir")).unwrap();

    let fs = Filesystem::new(root.path()).unwrap();
    let list = fs.list("/").await.unwrap();

    let names: Vec<&str> = list.iter().map(|fi| fi.name.as_str()).collect();
    assert_eq!(names, vec!["a.txt", "b.txt", "dir"]);
    assert_eq!(list[1].metadata.len(), 3);
    assert!(list[2].metadata.is_dir());
}

#[tokio::test]
async fn fs_get_names_the_entry() {
    let root = tempfile::tempdir().unwrap();
    std::fs::create_dir(root.path().join("sub")).unwrap();
    std::fs::write(root.path().join("sub").join("f"), b"12345").unwrap();

    let fs = Filesystem::new(root.path()).unwrap();
    let fi = fs.get("/sub/f").await.unwrap();
    assert_eq!(fi.name, "f");
    assert_eq!(fi.metadata.len(), 5);
    assert_eq!(fs.get("/").await.unwrap().name, ".");
    assert!(fs.get("missing").await.is_err());
}

#[tokio::test]
async fn fs_chdir_and_mkdir() {
    let root = tempfile::tempdir().unwrap();
    let mut fs = Filesystem::new(root.path()).unwrap();

    assert_eq!(fs.mkdir("x/y").await.unwrap(), "/x/y");
    assert_eq!(fs.chdir("x").await.unwrap(), "/x");
    assert_eq!(fs.chdir("y").await.unwrap(), "/x/y");
    assert_eq!(fs.chdir("../../..").await.unwrap(), "/");
    assert_eq!(fs.current_directory().await.unwrap(), "/");

    let err = fs.chdir("nope").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermanentDirectoryNotAvailable);
}

#[tokio::test]
async fn fs_write_then_read_from_offset() {
    let root = tempfile::tempdir().unwrap();
    let fs = Filesystem::new(root.path()).unwrap();

    let mut opened = fs.write("data.bin", WriteOptions::default()).await.unwrap();
    assert_eq!(opened.client_path, "/data.bin");
    opened.stream.write_all(b"hello world").await.unwrap();
    opened.stream.shutdown().await.unwrap();

    let mut opened = fs.read("data.bin", 6).await.unwrap();
    let mut out = String::new();
    opened.stream.read_to_string(&mut out).await.unwrap();
    assert_eq!(out, "world");
}

#[tokio::test]
async fn fs_append_from_offset_cuts_the_tail() {
    let root = tempfile::tempdir().unwrap();
    std::fs::write(root.path().join("f"), b"0123456789").unwrap();
    let fs = Filesystem::new(root.path()).unwrap();

    let mut opened = fs.write("f", WriteOptions { append: true, start: 4 }).await.unwrap();
    opened.stream.write_all(b"abc").await.unwrap();
    opened.stream.shutdown().await.unwrap();

    assert_eq!(std::fs::read(root.path().join("f")).unwrap(), b"0123abc");
}

#[tokio::test]
async fn fs_read_refuses_directories() {
    let root = tempfile::tempdir().unwrap();
    std::fs::create_dir(root.path().join("d")).unwrap();
    let fs = Filesystem::new(root.path()).unwrap();
    assert!(fs.read("d", 0).await.is_err());
}

#[tokio::test]
async fn fs_aborted_upload_leaves_nothing_behind() {
    let root = tempfile::tempdir().unwrap();
    let fs = Filesystem::new(root.path()).unwrap();

    let mut opened = fs.write("partial", WriteOptions::default()).await.unwrap();
    opened.stream.write_all(b"half of it").await.unwrap();
    opened.stream.abort().await.unwrap();

    assert!(!root.path().join("partial").exists());
}

#[tokio::test]
async fn fs_aborted_append_restores_the_original() {
    let root = tempfile::tempdir().unwrap();
    std::fs::write(root.path().join("log"), b"line one\n").unwrap();
    let fs = Filesystem::new(root.path()).unwrap();

    let mut opened = fs.write("log", WriteOptions { append: true, start: 0 }).await.unwrap();
    opened.stream.write_all(b"garbage").await.unwrap();
    opened.stream.flush().await.unwrap();
    opened.stream.abort().await.unwrap();

    assert_eq!(std::fs::read(root.path().join("log")).unwrap(), b"line one\n");
}

#[tokio::test]
async fn fs_delete_and_rename() {
    let root = tempfile::tempdir().unwrap();
    std::fs::write(root.path().join("old"), b"x").unwrap();
    std::fs::create_dir(root.path().join("empty")).unwrap();
    let fs = Filesystem::new(root.path()).unwrap();

    fs.rename("old", "new").await.unwrap();
    assert!(root.path().join("new").exists());
    fs.delete("new").await.unwrap();
    fs.delete("empty").await.unwrap();
    assert!(!root.path().join("new").exists());
    assert!(!root.path().join("empty").exists());
    assert!(fs.delete("/").await.is_err());
}

#[tokio::test]
async fn fs_unique_name_keeps_the_directory() {
    let root = tempfile::tempdir().unwrap();
    let fs = Filesystem::new(root.path()).unwrap();

    let a = fs.unique_name("up/file.txt").await.unwrap();
    let b = fs.unique_name("up/file.txt").await.unwrap();
    assert!(a.starts_with("up/"));
    assert_ne!(a, b);
    assert!(!fs.unique_name("file.txt").await.unwrap().contains('/'));
}

#[tokio::test]
async fn fs_enter_confines_to_home() {
    let root = tempfile::tempdir().unwrap();
    std::fs::create_dir(root.path().join("alice")).unwrap();
    std::fs::write(root.path().join("alice").join("mine"), b"1").unwrap();
    std::fs::write(root.path().join("secret"), b"2").unwrap();

    let mut fs = Filesystem::new(root.path()).unwrap();
    fs.enter(&Principal::with_root("alice", "/alice")).unwrap();

    assert!(fs.get("/mine").await.is_ok());
    assert!(fs.get("../secret").await.is_err());
}

#[cfg(unix)]
#[tokio::test]
async fn fs_chmod() {
    let root = tempfile::tempdir().unwrap();
    std::fs::write(root.path().join("f"), b"x").unwrap();
    let fs = Filesystem::new(root.path()).unwrap();

    fs.chmod("f", 0o600).await.unwrap();
    let fi = fs.get("f").await.unwrap();
    assert_eq!(fi.metadata.mode().map(|m| m & 0o777), Some(0o600));
}
