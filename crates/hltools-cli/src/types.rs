use hltools_core::report::VerificationReport;
use serde::Serialize;

#[derive(Serialize)]
pub(crate) struct VerifyJson<'a> {
    pub(crate) map: &'a str,
    pub(crate) ok: bool,
    pub(crate) error: Option<String>,
    pub(crate) server_capable: Option<bool>,
    pub(crate) client_capable: Option<bool>,
    pub(crate) penalty: Option<usize>,
    pub(crate) report: Option<&'a VerificationReport>,
}

#[derive(Serialize)]
pub(crate) struct InspectJson<'a> {
    pub(crate) path: &'a str,
    pub(crate) version: i32,
    pub(crate) file_length_bytes: u64,
    pub(crate) lumps: Vec<LumpJson>,
    pub(crate) textures: Vec<TextureJson>,
}

#[derive(Serialize)]
pub(crate) struct LumpJson {
    pub(crate) name: &'static str,
    pub(crate) offset: u32,
    pub(crate) size: u32,
    pub(crate) count: Option<u64>,
    pub(crate) error: Option<String>,
}

#[derive(Serialize)]
pub(crate) struct TextureJson {
    pub(crate) name: String,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) external: bool,
}

#[derive(Serialize)]
pub(crate) struct EntityJson<'a> {
    pub(crate) classname: Option<&'a str>,
    pub(crate) pairs: Vec<(&'a str, &'a str)>,
}

#[derive(Serialize)]
pub(crate) struct WadJson<'a> {
    pub(crate) path: &'a str,
    pub(crate) magic: String,
    pub(crate) magic_ok: bool,
    pub(crate) entry_count: u32,
    pub(crate) directory_offset: u32,
    pub(crate) entries: Vec<WadEntryJson<'a>>,
}

#[derive(Serialize)]
pub(crate) struct WadEntryJson<'a> {
    pub(crate) name: &'a str,
    pub(crate) kind: &'static str,
    pub(crate) offset: u32,
    pub(crate) compressed_size: u32,
    pub(crate) uncompressed_size: u32,
    pub(crate) compression: u8,
}
