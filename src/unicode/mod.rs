//! UTF-8 to DOS code page conversion engine
//!
//! Text crossing the boundary between the host (UTF-8) and an emulated DOS
//! program (one single-byte code page) goes through [`UnicodeConverter`].
//! The converter reads declarative mapping resources on first use, builds
//! the lookup tables of each code page the first time it is requested, and
//! keeps everything for its whole life.

pub mod codec;
pub mod error;
pub mod grapheme;
pub mod loader;
pub mod models;

mod convert;
mod mapping;
mod tokens;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use log::{error, info, warn};

pub use codec::{utf8_to_wide, wide_to_utf8};
pub use error::{LoadError, Result, SyntaxErrorKind};
pub use grapheme::{is_combining_mark, Grapheme};
pub use models::{DecompositionRules, DEFAULT_CODE_PAGE, REPLACEMENT_CHARACTER};

use mapping::MappingCache;
use models::{AsciiFallback, MainConfig};

/// Services the embedding emulator provides to the conversion engine.
pub trait EmulatorHost {
    /// Resolve a resource subdirectory to a host filesystem path.
    fn resource_path(&self, subdir: &str) -> PathBuf;

    /// The code page the emulated DOS currently has loaded.
    fn loaded_code_page(&self) -> u16;

    /// Whether the emulated video adapter can load a custom character set
    /// (EGA and better). Below that the hardware character set rules and
    /// only the default code page makes sense.
    fn can_reload_character_set(&self) -> bool;
}

/// Resource files read on first use, then fixed for the life of the engine.
#[derive(Debug, Default)]
struct LoadedConfig {
    main: MainConfig,
    ascii: AsciiFallback,
    decomposition: DecompositionRules,
}

/// Bidirectional text converter between UTF-8 and DOS code pages.
///
/// Conversion to DOS tries, for every input grapheme: the code page's own
/// mapping (normalized, then decomposed), the configured cross code point
/// aliases, the 7-bit ASCII fallback table, and finally mark stripping.
/// Whatever still fails becomes `?`. Conversion from DOS additionally
/// renders the screen code pictograms for bytes below 0x20.
///
/// The engine is single-threaded by design; wrap it in external
/// synchronization if it has to be shared.
pub struct UnicodeConverter<H> {
    host: H,
    config: Option<LoadedConfig>,
    cache: MappingCache,
    warned_code_points: HashSet<u16>,
    warned_code_pages: HashSet<u16>,
    warned_default_failure: bool,
}

impl<H: EmulatorHost> UnicodeConverter<H> {
    pub fn new(host: H) -> Self {
        UnicodeConverter {
            host,
            config: None,
            cache: MappingCache::default(),
            warned_code_points: HashSet::new(),
            warned_code_pages: HashSet::new(),
            warned_default_failure: false,
        }
    }

    /// Convert UTF-8 text to the active code page.
    ///
    /// Returns the DOS string and whether every grapheme was represented
    /// exactly; replacements for malformed UTF-8 or unmappable graphemes
    /// make it false. The output always has one character per input
    /// grapheme.
    pub fn utf8_to_dos(&mut self, input: &[u8]) -> (Vec<u8>, bool) {
        self.load_config_if_needed();
        let code_page = self.active_code_page();
        self.convert_to_dos(input, code_page)
    }

    /// Convert UTF-8 text to the given code page; 0 selects pure 7-bit
    /// ASCII operation. An unknown code page falls back to the default.
    pub fn utf8_to_dos_with_code_page(&mut self, input: &[u8], code_page: u16) -> (Vec<u8>, bool) {
        self.load_config_if_needed();
        let code_page = self.resolve_requested(code_page);
        self.convert_to_dos(input, code_page)
    }

    /// Convert a DOS string to UTF-8 using the active code page. Never
    /// fails; unmapped characters come out as `?`.
    pub fn dos_to_utf8(&mut self, input: &[u8]) -> Vec<u8> {
        self.load_config_if_needed();
        let code_page = self.active_code_page();
        self.convert_to_utf8(input, code_page)
    }

    /// Convert a DOS string to UTF-8 using the given code page.
    pub fn dos_to_utf8_with_code_page(&mut self, input: &[u8], code_page: u16) -> Vec<u8> {
        self.load_config_if_needed();
        let code_page = self.resolve_requested(code_page);
        self.convert_to_utf8(input, code_page)
    }

    /// The code page the argument-less conversions would use right now: the
    /// default one below EGA or when the active code page is unsupported,
    /// otherwise the deduplicated active code page. 0 means not even the
    /// default could be prepared and only the ASCII fallback operates.
    pub fn utf8_code_page(&mut self) -> u16 {
        self.load_config_if_needed();
        self.active_code_page()
    }

    /// Read the decomposition rules, the ASCII fallback table and the main
    /// configuration on the first call; later calls are free.
    fn load_config_if_needed(&mut self) {
        if self.config.is_some() {
            return;
        }

        let root = self.host.resource_path(loader::DIR_NAME_MAPPING);
        let decomposition = import(&root, loader::FILE_NAME_DECOMPOSITION, loader::load_decomposition_rules);
        let ascii = import(&root, loader::FILE_NAME_ASCII, loader::load_ascii_fallback);
        let main = import(&root, loader::FILE_NAME_MAIN, loader::load_main_config);

        info!(
            "mapping configuration loaded: {} code pages, {} aliases, {} decomposition rules",
            main.mappings.len(),
            main.aliases.len(),
            decomposition.len()
        );
        self.config = Some(LoadedConfig {
            main,
            ascii,
            decomposition,
        });
    }

    fn active_code_page(&mut self) -> u16 {
        if !self.host.can_reload_character_set() {
            // Below EGA it was not possible to change the character set
            return self.default_code_page();
        }

        let code_page = self.deduplicate(self.host.loaded_code_page());
        if self.prepare(code_page) {
            code_page
        } else {
            self.default_code_page()
        }
    }

    fn resolve_requested(&mut self, code_page: u16) -> u16 {
        if code_page == 0 {
            return 0;
        }

        let deduplicated = self.deduplicate(code_page);
        if self.prepare(deduplicated) {
            return deduplicated;
        }

        if self.warned_code_pages.insert(code_page) {
            warn!("requested unknown code page {code_page}");
        }
        self.default_code_page()
    }

    fn default_code_page(&mut self) -> u16 {
        if self.prepare(DEFAULT_CODE_PAGE) {
            return DEFAULT_CODE_PAGE;
        }

        if !self.warned_default_failure {
            self.warned_default_failure = true;
            warn!("unable to prepare the default code page");
        }
        0
    }

    fn deduplicate(&self, code_page: u16) -> u16 {
        match &self.config {
            Some(config) => mapping::resolve_duplicate(&config.main, code_page),
            None => code_page,
        }
    }

    fn prepare(&mut self, code_page: u16) -> bool {
        let UnicodeConverter {
            host,
            config,
            cache,
            ..
        } = self;
        match config {
            Some(config) => {
                mapping::prepare(cache, code_page, &config.main, &config.decomposition, &*host)
            }
            None => false,
        }
    }

    fn convert_to_dos(&mut self, input: &[u8], code_page: u16) -> (Vec<u8>, bool) {
        let (wide, decoded) = codec::utf8_to_wide(input);

        let UnicodeConverter {
            config,
            cache,
            warned_code_points,
            ..
        } = self;
        let config = config.get_or_insert_with(LoadedConfig::default);

        let tables = if code_page != 0 { cache.get(code_page) } else { None };
        let (bytes, converted) = convert::wide_to_dos(
            &wide,
            tables,
            &config.ascii,
            &config.decomposition,
            warned_code_points,
        );
        (bytes, decoded && converted)
    }

    fn convert_to_utf8(&mut self, input: &[u8], code_page: u16) -> Vec<u8> {
        let tables = if code_page != 0 { self.cache.get(code_page) } else { None };
        let reverse = tables.map(|tables| &tables.reverse);

        let wide = convert::dos_to_wide(input, reverse);
        codec::wide_to_utf8(&wide)
    }
}

/// Load one resource file, degrading to the empty default when it is
/// missing or malformed.
fn import<T: Default>(root: &Path, file_name: &str, load: impl Fn(&Path) -> Result<T>) -> T {
    let path = root.join(file_name);
    match load(&path) {
        Ok(value) => value,
        Err(err) => {
            error!("could not use mapping file {}: {}", path.display(), err);
            T::default()
        }
    }
}
