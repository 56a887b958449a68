//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use tempfile::TempDir;

pub const WELL_FORMED_WINDOW: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Window x:Class="KOALAOptimizer.Testing.MainWindow"
        xmlns="http://schemas.microsoft.com/winfx/2006/xaml/presentation"
        xmlns:x="http://schemas.microsoft.com/winfx/2006/xaml"
        Title="KOALA Gaming Optimizer">
    <StackPanel>
        <TextBlock Text="Smart Gaming Detection &amp; Auto-Optimization"/>
        <TextBlock Text="Power Management &amp; Performance"/>
    </StackPanel>
</Window>
"#;

pub const WELL_FORMED_APP: &str = r#"<Application x:Class="KOALAOptimizer.Testing.App"
             xmlns="http://schemas.microsoft.com/winfx/2006/xaml/presentation"
             xmlns:x="http://schemas.microsoft.com/winfx/2006/xaml"
             StartupUri="MainWindow.xaml">
    <Application.Resources/>
</Application>
"#;

/// Raw '&' on line 2, column 43
pub const UNESCAPED_AMPERSAND: &str = "<Grid>
  <TextBlock Text=\"Smart Gaming Detection & Auto-Optimization\"/>
</Grid>
";

/// Write `files` (relative path, contents) under a fresh temporary directory
pub fn project(files: &[(&str, &str)]) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    for (relative, contents) in files {
        write_file(temp_dir.path(), relative, contents);
    }
    temp_dir
}

pub fn write_file(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}
