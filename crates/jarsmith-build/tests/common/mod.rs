//! Shared helpers: class-file fixtures and fake JDK tools
#![allow(dead_code)]

use jarsmith_build::{JavaHome, Toolchain};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const MAIN: (&str, &str) = ("main", "([Ljava/lang/String;)V");
pub const AGENTMAIN: (&str, &str) = (
    "agentmain",
    "(Ljava/lang/String;Ljava/lang/instrument/Instrumentation;)V",
);
pub const PREMAIN: (&str, &str) = ("premain", "(Ljava/lang/String;)V");

/// Minimal class file declaring public static `methods`
pub fn class_bytes(internal_name: &str, methods: &[(&str, &str)]) -> Vec<u8> {
    fn utf8(out: &mut Vec<u8>, s: &str) {
        out.push(1);
        out.extend_from_slice(&(s.len() as u16).to_be_bytes());
        out.extend_from_slice(s.as_bytes());
    }

    let mut pool = Vec::new();
    utf8(&mut pool, internal_name);
    pool.extend_from_slice(&[7, 0, 1]);
    utf8(&mut pool, "java/lang/Object");
    pool.extend_from_slice(&[7, 0, 3]);
    let mut next = 5u16;
    let mut refs = Vec::new();
    for (name, descriptor) in methods {
        utf8(&mut pool, name);
        utf8(&mut pool, descriptor);
        refs.push((next, next + 1));
        next += 2;
    }

    let mut out = vec![0xCA, 0xFE, 0xBA, 0xBE, 0, 0, 0, 61];
    out.extend_from_slice(&next.to_be_bytes());
    out.extend_from_slice(&pool);
    out.extend_from_slice(&[0x00, 0x21, 0, 2, 0, 4, 0, 0, 0, 0]);
    out.extend_from_slice(&(methods.len() as u16).to_be_bytes());
    for (name_idx, desc_idx) in refs {
        out.extend_from_slice(&[0x00, 0x09]);
        out.extend_from_slice(&name_idx.to_be_bytes());
        out.extend_from_slice(&desc_idx.to_be_bytes());
        out.extend_from_slice(&[0, 0]);
    }
    out.extend_from_slice(&[0, 0]);
    out
}

/// A scratch project with a fake JDK whose compiler "produces" fixture classes
pub struct Project {
    temp: TempDir,
}

impl Project {
    pub fn new() -> Self {
        let project = Self {
            temp: TempDir::new().unwrap(),
        };
        fs::create_dir_all(project.fixture_dir()).unwrap();
        fs::create_dir_all(project.jdk_home().join("bin")).unwrap();
        project
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn jdk_home(&self) -> PathBuf {
        self.root().join("jdk")
    }

    pub fn fixture_dir(&self) -> PathBuf {
        self.root().join("fixture")
    }

    /// Archive path inside the project's cache directory
    pub fn jar(&self, name: &str) -> PathBuf {
        self.root().join("cache").join(name)
    }

    /// Write a source file; its content is never compiled for real
    pub fn source(&self, name: &str) -> PathBuf {
        let path = self.root().join(name);
        fs::write(&path, "// source\n").unwrap();
        path
    }

    /// Add a class the fake compiler will emit, e.g. `dev/example/Main`
    pub fn class(&self, internal_name: &str, methods: &[(&str, &str)]) {
        let path = self.fixture_dir().join(format!("{}.class", internal_name));
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, class_bytes(internal_name, methods)).unwrap();
    }

    /// Fake `javac` copying the fixture into `-d` and exiting with `exit_code`
    pub fn fake_javac(&self, exit_code: i32) {
        let script = format!(
            r#"#!/bin/sh
echo "$@" >> "{log}"
out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "-d" ]; then out="$2"; shift; fi
  shift
done
if [ {code} -eq 0 ]; then cp -R "{fixture}/." "$out/"; fi
exit {code}
"#,
            log = self.log("javac").display(),
            fixture = self.fixture_dir().display(),
            code = exit_code,
        );
        self.tool("javac", &script);
    }

    /// Fake `native-image` writing its last argument as the binary
    pub fn fake_native_image(&self) {
        let script = format!(
            r#"#!/bin/sh
echo "$@" >> "{log}"
for last; do :; done
echo "native binary" > "$last"
echo "native-image done"
"#,
            log = self.log("native-image").display(),
        );
        self.tool("native-image", &script);
    }

    /// How many times the fake `tool` ran
    pub fn invocations(&self, tool: &str) -> usize {
        fs::read_to_string(self.log(tool))
            .map(|log| log.lines().count())
            .unwrap_or(0)
    }

    /// Toolchain whose JDK is the fake one, defaulting to Java 17
    pub fn toolchain(&self) -> Toolchain {
        Toolchain::new(JavaHome::new(Some(self.jdk_home()), 17))
    }

    fn log(&self, tool: &str) -> PathBuf {
        self.root().join(format!("{}.log", tool))
    }

    #[cfg(unix)]
    fn tool(&self, name: &str, script: &str) {
        use std::os::unix::fs::PermissionsExt;

        let path = self.jdk_home().join("bin").join(name);
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[cfg(not(unix))]
    fn tool(&self, _name: &str, _script: &str) {
        unimplemented!("fake tools are shell scripts")
    }
}
