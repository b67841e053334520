/// File categorization by extension.
///
/// This module owns the closed set of categories a file can be sorted into
/// and the extension table that maps a lower-cased extension (with its
/// leading dot) to exactly one of them.
///
/// # Examples
///
/// ```
/// use tidydir::file_category::{Category, ExtensionTable};
///
/// let table = ExtensionTable::standard();
/// assert_eq!(table.lookup(".png"), Category::Images);
/// assert_eq!(table.lookup(".MP3"), Category::Audio);
/// assert_eq!(table.lookup(".nope"), Category::Files);
/// ```
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Represents a file category.
///
/// Each category maps to one directory under the target root. `Files` is
/// the catch-all for anything the extension table does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Installers and application bundles (EXE, DEB, APK, etc.)
    Applications,
    /// Compressed archives (ZIP, TAR, 7Z, etc.)
    Archives,
    /// Documents (PDF, DOCX, ODT, etc.)
    Documents,
    /// Font files (TTF, OTF, WOFF, etc.)
    Fonts,
    /// Image files, including camera raw formats
    Images,
    /// Shell and interpreter scripts (SH, PY, PS1, etc.)
    Scripts,
    /// Plain text, markup and data files (TXT, MD, JSON, etc.)
    Text,
    /// Video files (MP4, MKV, AVI, etc.)
    Videos,
    /// 3D models and scenes (OBJ, FBX, STL, etc.)
    ThreeD,
    /// Disk and optical images (ISO, IMG, VMDK, etc.)
    DiskImages,
    /// Virtual machine definitions and state
    Vms,
    /// Audio files and playlists
    Audio,
    /// Ebook formats (EPUB, MOBI, AZW, etc.)
    Ebooks,
    /// Spreadsheets (XLSX, CSV, ODS, etc.)
    Spreadsheets,
    /// Slide decks and diagrams
    Presentations,
    /// Source code, build files and compiled artifacts
    Code,
    /// Everything else
    Files,
}

impl Category {
    /// Every category, in declaration order.
    pub const ALL: [Category; 17] = [
        Category::Applications,
        Category::Archives,
        Category::Documents,
        Category::Fonts,
        Category::Images,
        Category::Scripts,
        Category::Text,
        Category::Videos,
        Category::ThreeD,
        Category::DiskImages,
        Category::Vms,
        Category::Audio,
        Category::Ebooks,
        Category::Spreadsheets,
        Category::Presentations,
        Category::Code,
        Category::Files,
    ];

    /// Returns the directory name for this category.
    ///
    /// # Examples
    ///
    /// ```
    /// use tidydir::file_category::Category;
    ///
    /// assert_eq!(Category::Images.dir_name(), "Images");
    /// assert_eq!(Category::ThreeD.dir_name(), "3D");
    /// assert_eq!(Category::DiskImages.dir_name(), "Disk Images");
    /// ```
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Applications => "Applications",
            Category::Archives => "Archives",
            Category::Documents => "Documents",
            Category::Fonts => "Fonts",
            Category::Images => "Images",
            Category::Scripts => "Scripts",
            Category::Text => "Text",
            Category::Videos => "Videos",
            Category::ThreeD => "3D",
            Category::DiskImages => "Disk Images",
            Category::Vms => "VMs",
            Category::Audio => "Audio",
            Category::Ebooks => "Ebooks",
            Category::Spreadsheets => "Spreadsheets",
            Category::Presentations => "Presentations",
            Category::Code => "Code",
            Category::Files => "Files",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// An extension that was listed under a second category and dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateExtension {
    /// The lower-cased extension, with its leading dot.
    pub extension: String,
    /// The category that listed it first and keeps it.
    pub kept: Category,
    /// The category whose listing was ignored.
    pub dropped: Category,
}

/// Errors raised while building an extension table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// The same extension appears under two categories.
    #[error("extension '{extension}' is listed under both {first} and {second}")]
    DuplicateExtension {
        extension: String,
        first: Category,
        second: Category,
    },
}

/// Extension listings grouped by category.
///
/// Order matters: when an extension shows up under more than one category,
/// the group listed first owns it.
pub type ExtensionGroups<'a> = &'a [(Category, &'a [&'a str])];

/// Maps lower-cased extensions to categories.
///
/// Built once from grouped listings and never mutated afterwards. Every key
/// belongs to exactly one category.
#[derive(Debug, Clone)]
pub struct ExtensionTable {
    extension_map: HashMap<String, Category>,
    duplicates: Vec<DuplicateExtension>,
}

impl ExtensionTable {
    /// Builds the table shipped with tidydir.
    ///
    /// The built-in listings contain a handful of extensions claimed by two
    /// categories; the first listed owner keeps them and the rest are
    /// reported by [`ExtensionTable::duplicates`].
    pub fn standard() -> Self {
        Self::from_groups(STANDARD_GROUPS)
    }

    /// Builds a table, keeping the first owner of any duplicated extension.
    pub fn from_groups(groups: ExtensionGroups<'_>) -> Self {
        let mut extension_map = HashMap::new();
        let mut duplicates = Vec::new();

        for &(category, extensions) in groups {
            for ext in extensions {
                let key = normalize(ext);
                match extension_map.get(&key) {
                    Some(&owner) if owner == category => {}
                    Some(&owner) => duplicates.push(DuplicateExtension {
                        extension: key,
                        kept: owner,
                        dropped: category,
                    }),
                    None => {
                        extension_map.insert(key, category);
                    }
                }
            }
        }

        Self {
            extension_map,
            duplicates,
        }
    }

    /// Builds a table, refusing any extension listed under two categories.
    ///
    /// # Errors
    ///
    /// Returns `TableError::DuplicateExtension` for the first conflict found.
    pub fn try_from_groups(groups: ExtensionGroups<'_>) -> Result<Self, TableError> {
        let table = Self::from_groups(groups);
        match table.duplicates.first() {
            Some(dup) => Err(TableError::DuplicateExtension {
                extension: dup.extension.clone(),
                first: dup.kept,
                second: dup.dropped,
            }),
            None => Ok(table),
        }
    }

    /// Maps an extension to its category.
    ///
    /// Matching is case-insensitive and expects the leading dot, as produced
    /// by the classifier. Unknown or empty extensions map to `Category::Files`.
    pub fn lookup(&self, ext: &str) -> Category {
        if ext.is_empty() {
            return Category::Files;
        }
        self.extension_map
            .get(&normalize(ext))
            .copied()
            .unwrap_or(Category::Files)
    }

    /// Extensions dropped while building because another category owned them.
    pub fn duplicates(&self) -> &[DuplicateExtension] {
        &self.duplicates
    }

    /// Iterates over every known extension and its category.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Category)> {
        self.extension_map.iter().map(|(ext, cat)| (ext.as_str(), *cat))
    }

    /// Number of distinct extensions in the table.
    pub fn len(&self) -> usize {
        self.extension_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extension_map.is_empty()
    }
}

impl Default for ExtensionTable {
    fn default() -> Self {
        Self::standard()
    }
}

fn normalize(ext: &str) -> String {
    let lower = ext.to_lowercase();
    if lower.starts_with('.') {
        lower
    } else {
        format!(".{lower}")
    }
}

/// Built-in listings. Multi-dot suffixes such as `.tar.gz` are not listed:
/// only the final extension of a name is ever looked up.
const STANDARD_GROUPS: ExtensionGroups<'static> = &[
    (
        Category::Images,
        &[
            ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".svg", ".ico", ".tiff", ".webp", ".psd",
            ".xcf", ".raw", ".heif", ".heic", ".dng", ".cr2", ".nef", ".arw", ".orf", ".rw2",
            ".pef", ".sr2", ".raf", ".mrw", ".dcr", ".mos", ".nrw", ".ptx", ".pxn", ".r3d",
            ".x3f", ".srw", ".tga", ".dds", ".jfif", ".jp2", ".jpx", ".pbm", ".pgm", ".ppm",
            ".pnm", ".mng", ".apng", ".clip", ".cpt", ".exr", ".hdr", ".picti", ".sct", ".sgi",
            ".targa", ".vicar", ".viff", ".cur", ".ani",
        ],
    ),
    (
        Category::ThreeD,
        &[
            ".obj", ".fbx", ".dae", ".3ds", ".blend", ".stl", ".ply", ".gltf", ".glb", ".usdz",
            ".x3d", ".x3db", ".bvh", ".dxf", ".lwo", ".lws", ".m3d", ".md2", ".md3", ".md5",
            ".mesh", ".mot", ".ms3d", ".nif", ".off", ".ogex", ".q3d", ".q3s", ".raw", ".smd",
            ".u3d", ".vrml", ".wrl", ".x", ".xgl", ".zgl", ".3dm", ".max", ".3dxml", ".x3dz",
            ".x3dbz", ".x3dv", ".x3dvz", ".c4d", ".lxo", ".ma", ".mb", ".jas", ".mdl", ".wire",
            ".iges", ".igs", ".step", ".stp",
        ],
    ),
    (
        Category::Spreadsheets,
        &[
            ".xls", ".xlsx", ".ods", ".xlsm", ".xlsb", ".xltx", ".xltm", ".csv", ".tsv",
            ".dif", ".dbf", ".prn", ".slk", ".gnumeric", ".numbers", ".et", ".wks", ".wk1",
            ".wk2", ".wk3", ".wk4", ".xlr", ".xlt", ".xlam", ".xla", ".xlw", ".xlc", ".ots",
            ".sxc", ".stc", ".fods", ".wq1", ".wq2", ".wku", ".dex", ".px",
        ],
    ),
    (
        Category::Presentations,
        &[
            ".ppt", ".pptx", ".odp", ".pps", ".ppsx", ".pptm", ".ppsm", ".potx", ".potm",
            ".pot", ".otp", ".sxi", ".sti", ".pez", ".prz", ".shw", ".show", ".slp", ".sspss",
            ".ope", ".sdd", ".sdp", ".sdw", ".sgl", ".sor", ".sxd", ".sxg", ".sxm", ".sxw",
            ".uop", ".vor", ".vsd", ".vss", ".vst", ".vdx", ".vsx", ".vtx", ".vsw", ".vsdx",
            ".vssx", ".vstx", ".vsdm", ".vssm", ".vstm", ".gslides", ".fodp", ".sldx", ".sldm",
        ],
    ),
    (
        Category::Audio,
        &[
            ".mp3", ".wav", ".flac", ".aac", ".ogg", ".wma", ".m4a", ".opus", ".ape", ".mka",
            ".au", ".aiff", ".aif", ".aifc", ".dts", ".dtshd", ".ac3", ".amr", ".awb", ".dss",
            ".dvf", ".m4b", ".m4p", ".mmf", ".mpc", ".msv", ".oga", ".mogg", ".ra", ".rm",
            ".raw", ".sln", ".tta", ".voc", ".vox", ".wv", ".8svx", ".cda", ".mid",
            ".midi", ".mus", ".sib", ".sid", ".xm", ".it", ".s3m", ".mod", ".mtm", ".umx",
            ".vgm", ".vgz", ".alac", ".mlp", ".dsd", ".dsf", ".dff", ".tak", ".thd", ".caf",
            ".kar", ".snd", ".vqf", ".spx", ".spc", ".gym", ".adx", ".dsp", ".adp", ".ymf",
            ".ast", ".afc", ".lwav", ".smp", ".aud", ".sng", ".imf", ".m15", ".ply", ".m3u",
            ".m3u8", ".pls", ".asx", ".xspf",
        ],
    ),
    (
        Category::Videos,
        &[
            ".mp4", ".avi", ".mkv", ".mov", ".wmv", ".flv", ".webm", ".m4v", ".mpg", ".mpeg",
            ".3gp", ".3g2", ".f4v", ".f4p", ".ogv", ".ogg", ".drc", ".mng", ".qt", ".yuv",
            ".rm", ".rmvb", ".asf", ".amv", ".m2v", ".svi", ".mxf", ".roq", ".nsv", ".f4a",
            ".f4b", ".m2ts", ".mts", ".vob", ".dv", ".mj2", ".mjpeg", ".m1v", ".m2p", ".m2t",
            ".m4p", ".minipsf", ".nut", ".bik", ".smk", ".viv", ".daf", ".divx", ".evo",
            ".mk3d", ".ivf", ".mpe", ".mpv", ".mpv2", ".fli", ".flc", ".fxm", ".emf", ".ts",
            ".tsv", ".tsa", ".camrec", ".dav", ".wtv", ".ssif", ".smv", ".rv", ".dvr-ms",
            ".mswmm", ".mseq", ".seq", ".clpi", ".rec", ".bdm", ".bdmv",
        ],
    ),
    (
        Category::Documents,
        &[
            ".pdf", ".doc", ".docx", ".odt", ".rtf", ".tex", ".wpd", ".wps", ".pages", ".key",
            ".odp", ".ods", ".odf", ".xps", ".ps", ".eps", ".prn", ".dvi",
        ],
    ),
    (
        Category::Archives,
        &[
            ".zip", ".tar", ".gz", ".rar", ".7z", ".bz2", ".xz", ".tgz", ".cab", ".arj", ".z",
            ".lz", ".lzma", ".lzo", ".rz", ".sz", ".dz",
        ],
    ),
    (
        Category::Applications,
        &[
            ".exe", ".msi", ".app", ".deb", ".rpm", ".dmg", ".pkg", ".appimage", ".apk",
            ".ipa", ".xpi", ".vsix",
        ],
    ),
    (
        Category::DiskImages,
        &[
            ".iso", ".img", ".vhd", ".vhdx", ".vdi", ".vmdk", ".dmg", ".cdr", ".dvd", ".wim",
            ".swm", ".esd", ".nrg", ".mdf", ".mds", ".mdx", ".ccd", ".sub", ".ima", ".udf",
            ".bin", ".cue", ".daa", ".pxi", ".nri", ".isz", ".eui", ".vcd", ".bwt", ".cdi",
            ".b5t", ".b6t", ".bwi", ".bws", ".bwa", ".ape", ".flac", ".wv", ".sdi", ".mde",
            ".md0", ".md1", ".md2", ".xa", ".ede", ".eds", ".ddi", ".gbi", ".tib",
            ".vbox-extpack",
        ],
    ),
    (
        Category::Vms,
        &[
            ".ova", ".ovf", ".vbox", ".vbox-prev", ".vmc", ".vmwarevm", ".vmx", ".vmxf",
            ".vmsd", ".vmsn", ".vmss", ".nvram", ".vmem", ".vmtm", ".vmt", ".vhd", ".vhdx",
            ".avhd", ".avhdx", ".vud", ".vdi", ".hdd", ".pvs", ".sav", ".xva", ".qcow",
            ".qcow2", ".qed", ".vhdp",
        ],
    ),
    (
        Category::Fonts,
        &[
            ".ttf", ".otf", ".woff", ".woff2", ".eot", ".fon", ".fnt", ".ttc", ".pfb", ".pfm",
            ".afm", ".sfd", ".vlw",
        ],
    ),
    (
        Category::Scripts,
        &[
            ".py", ".js", ".sh", ".bat", ".ps1", ".rb", ".pl", ".php", ".bash", ".zsh",
            ".fish", ".ksh", ".csh", ".tcsh", ".awk", ".sed", ".lua", ".tcl", ".r", ".m",
            ".ahk", ".au3", ".applescript", ".vbs", ".cmd", ".psm1", ".psd1", ".ps1xml",
        ],
    ),
    (
        Category::Text,
        &[
            ".txt", ".md", ".log", ".csv", ".json", ".xml", ".yaml", ".yml", ".ini", ".cfg",
            ".conf", ".properties", ".toml", ".rst", ".tex", ".adoc", ".textile", ".creole",
            ".mediawiki", ".wiki", ".nfo", ".readme", ".asc", ".etx", ".irclog", ".man", ".me",
            ".plain", ".rpt", ".ans", ".ascii", ".diz", ".ezt", ".info", ".lit", ".lnt",
            ".text", ".strings", ".vtt", ".srt", ".sub", ".sbv", ".ssa", ".ass",
        ],
    ),
    (
        Category::Code,
        &[
            ".c", ".cpp", ".h", ".hpp", ".cc", ".cxx", ".c++", ".hh", ".hxx", ".h++", ".cp",
            ".tcc", ".inl", ".ipp", ".def", ".odl", ".idl", ".rc", ".rc2", ".rct", ".rgs",
            ".r", ".rd", ".rsx", ".fx", ".fxh", ".hlsl", ".vsh", ".psh", ".cg", ".shd",
            ".glsl", ".shader", ".java", ".class", ".jar", ".groovy", ".scala", ".clj",
            ".cljs", ".cljc", ".edn", ".kt", ".kts", ".dart", ".cs", ".csx", ".vb", ".vbs",
            ".bas", ".frm", ".cls", ".ctl", ".pag", ".dsr", ".dob", ".vbhtml", ".vbproj",
            ".sln", ".csproj", ".fs", ".fsi", ".ml", ".mli", ".fsx", ".fsscript", ".pas",
            ".pp", ".inc", ".lpr", ".lfm", ".dpr", ".dpk", ".dproj", ".groupproj", ".bdsgroup",
            ".bdsproj", ".bpr", ".dfm", ".nfm", ".xfm", ".fmx", ".res", ".chr", ".rs", ".rlib",
            ".so", ".dll", ".dylib", ".a", ".lib", ".la", ".lo", ".exp", ".pdb", ".idb",
            ".ilk", ".manifest", ".dep", ".iobj", ".ipdb", ".pch", ".gch", ".pchi", ".hdmp",
            ".ncb", ".aps", ".sbr", ".bsc", ".fd", ".fe", ".tlog", ".lastbuildstate", ".meta",
            ".obj", ".pgc", ".pgd", ".rsp", ".tli", ".tlh", ".tmp", ".tmp_proj", ".vspscc",
            ".vssscc", ".builds", ".pidb", ".svclog", ".scc", ".vcxproj", ".vcproj", ".vdproj",
            ".dbproj", ".go", ".s", ".asm", ".nasm", ".yasm", ".swift", ".playground", ".m",
            ".mm", ".d", ".di", ".dd", ".ddoc", ".map", ".pc", ".pod", ".rst", ".hs", ".lhs",
            ".hi", ".hc", ".cabal", ".erl", ".hrl", ".beam", ".app", ".yrl", ".xrl", ".ex",
            ".exs", ".eex", ".jl", ".nim", ".nims", ".nimble", ".zig", ".v", ".vh", ".sv",
            ".svh", ".vhd", ".vhdl", ".vho", ".vhs", ".vht", ".vhw", ".vhc", ".ucf", ".qsf",
            ".tcl", ".sdc", ".xdc", ".xise", ".gise", ".ise", ".xmp", ".xco", ".ngc", ".ngo",
            ".asy", ".prj", ".psl", ".rpt", ".veo", ".vmo", ".syr", ".par", ".pad",
            ".unroutes", ".xpi", ".xst", ".stx", ".ngm", ".mrp", ".xrpt", ".drc", ".bgn",
            ".bit", ".xwbt", ".ngd", ".bld", ".ncd", ".ngr", ".pcf", ".auto", ".trace", ".twr",
            ".twx", ".cmd_log", ".jhd", ".ant", ".gradle", ".mvn", ".ivy", ".project",
            ".classpath", ".settings", ".idea", ".iml", ".ipr", ".iws", ".pro", ".pri",
            ".cmake", ".ninja", ".mk", ".makefile", ".gnumakefile", ".rules", ".ninja_deps",
            ".ninja_log", ".bazel", ".bzl", ".build", ".workspace", ".gn", ".gni", ".gyp",
            ".gypi",
        ],
    ),
    (
        Category::Ebooks,
        &[
            ".epub", ".mobi", ".azw", ".azw3", ".fb2", ".lit", ".pdb", ".kf8", ".azw4", ".tpz",
            ".prc", ".tcr", ".snb", ".webz", ".txtz", ".htmlz", ".oeb", ".lrf", ".lrx", ".cbr",
            ".cbz", ".cbt", ".cba", ".cb7", ".djvu", ".ibooks", ".oxps", ".xps", ".fb3",
            ".kfx", ".acsm", ".mart", ".mbp", ".ybk", ".koob", ".eal", ".ebk", ".ebx", ".etd",
            ".hsb", ".lrs", ".nat", ".ncx", ".odb", ".odf", ".odm", ".odt", ".opu", ".opf",
            ".pef", ".phl", ".rzb", ".rzs", ".tcz", ".tr", ".tr3", ".xeb", ".ava", ".bkk",
            ".brn", ".ceb", ".dnl", ".edn", ".eit", ".ebm", ".ebo", ".ebr", ".ebs", ".ecw",
            ".emd", ".emo", ".eny", ".eot", ".eta", ".etx", ".evi", ".evy", ".fax", ".fcf",
            ".fdr", ".fds", ".fdt", ".fdx", ".fft", ".fha", ".fhd", ".fhf", ".fik", ".fkb",
            ".fub", ".gho", ".gpd", ".han", ".hbk", ".htz", ".htx", ".htz4", ".htz5", ".hux",
            ".hvx", ".hya", ".hyb", ".isx", ".jbr", ".jcr", ".kdz", ".keb", ".key", ".kfn",
            ".kml", ".kne", ".kon", ".kpf", ".kpw", ".lbr", ".lbxcol", ".lbxoeb", ".lbxosh",
            ".ldo", ".lix", ".llb", ".lrt", ".lrv", ".ltr", ".lts", ".ltz", ".lza", ".mag",
            ".meb", ".mht", ".mpub", ".msg", ".mwp", ".nfx", ".nva", ".obb", ".obk", ".obo",
            ".odc", ".odg", ".odi", ".odp", ".ods", ".oebzip", ".onb", ".oop", ".opz", ".orn",
            ".orv", ".osi", ".otb", ".ott", ".otu", ".otz", ".oux", ".ove", ".ovx", ".owb",
            ".owc", ".oxb", ".p7a", ".p7s", ".pck", ".pcz", ".pdg", ".pdz", ".pea", ".peb",
            ".pec", ".pex", ".pez", ".pfg", ".pfr", ".pk", ".pkg", ".plb", ".plc", ".pld",
            ".plf", ".pli", ".plx", ".pma", ".pmd", ".pml", ".pmlz", ".pmn", ".pmo", ".pmr",
            ".pmu", ".pmx", ".pmz", ".pnc", ".pnz", ".pot", ".ppa", ".ppb", ".ppn", ".ppo",
            ".ppp", ".ppw", ".ppx", ".pqa", ".pqb",
        ],
    ),
];
