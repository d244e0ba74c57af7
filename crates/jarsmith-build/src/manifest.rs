//! Archive manifest (`META-INF/MANIFEST.MF`) reading and writing

/// Location of the manifest inside the archive
pub const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";

pub const ATTR_MANIFEST_VERSION: &str = "Manifest-Version";
/// Entry point class
pub const ATTR_MAIN_CLASS: &str = "Main-Class";
/// Java version of the JDK that built the archive
pub const ATTR_BUILD_JDK: &str = "Build-Jdk";
/// Combined runtime options, each escaped in the portable dialect
pub const ATTR_JAVA_OPTIONS: &str = "Jarsmith-Java-Options";
/// Fingerprint of the class path the archive was compiled against
pub const ATTR_CLASSPATH_DIGEST: &str = "Jarsmith-Classpath-Digest";
pub const ATTR_AGENT_CLASS: &str = "Agent-Class";
pub const ATTR_PREMAIN_CLASS: &str = "Premain-Class";

/// Header lines may not exceed this many bytes
const MAX_LINE_BYTES: usize = 72;

/// Main section of a JAR manifest, keeping insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    attributes: Vec<(String, String)>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute, replacing any existing one (names are case-insensitive)
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self
            .attributes
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&key))
        {
            Some(entry) => entry.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Check that every attribute can be written and read back unchanged
    pub fn validate(&self) -> Result<(), String> {
        for (key, value) in &self.attributes {
            let valid_name = !key.is_empty()
                && key.len() <= MAX_LINE_BYTES - 2
                && key
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
            if !valid_name {
                return Err(format!("invalid attribute name '{}'", key));
            }
            if value.contains(['\r', '\n', '\0']) {
                return Err(format!("attribute '{}' contains a line break", key));
            }
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serialize with CRLF line endings and 72-byte line wrapping
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = String::new();
        for (key, value) in &self.attributes {
            write_wrapped(&mut out, &format!("{}: {}", key, value));
        }
        out.push_str("\r\n");
        out.into_bytes()
    }

    /// Parse the main section of a manifest
    pub fn parse(text: &str) -> Result<Self, String> {
        let mut manifest = Manifest::new();
        let mut current: Option<(String, String)> = None;

        for (idx, raw) in text.split('\n').enumerate() {
            let line = raw.strip_suffix('\r').unwrap_or(raw);
            if line.is_empty() {
                break;
            }
            if let Some(rest) = line.strip_prefix(' ') {
                match current.as_mut() {
                    Some((_, value)) => value.push_str(rest),
                    None => return Err(format!("line {}: continuation without header", idx + 1)),
                }
                continue;
            }
            if let Some((key, value)) = current.take() {
                manifest.set(key, value);
            }
            let (key, value) = line
                .split_once(": ")
                .ok_or_else(|| format!("line {}: malformed header '{}'", idx + 1, line))?;
            if key.is_empty() {
                return Err(format!("line {}: empty attribute name", idx + 1));
            }
            current = Some((key.to_string(), value.to_string()));
        }

        if let Some((key, value)) = current {
            manifest.set(key, value);
        }
        Ok(manifest)
    }
}

/// Emit `line`, continuing on lines starting with a single space
fn write_wrapped(out: &mut String, line: &str) {
    let mut width = 0;
    for c in line.chars() {
        let len = c.len_utf8();
        if width + len > MAX_LINE_BYTES {
            out.push_str("\r\n ");
            width = 1;
        }
        out.push(c);
        width += len;
    }
    out.push_str("\r\n");
}
