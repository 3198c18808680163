use crate::error::CompileError;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const SOURCE_SUFFIX: &str = ".c";
pub const ASM_SUFFIX: &str = ".s";

fn io_error(path: &Path, action: &'static str) -> impl FnOnce(std::io::Error) -> CompileError {
    let path = path.to_path_buf();
    move |source| CompileError::Io {
        path,
        action,
        source,
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// The file name must end in `.c` and have something before it.
pub fn check_source_path(path: &Path) -> Result<(), CompileError> {
    let name = file_name(path);
    if name.len() > SOURCE_SUFFIX.len() && name.ends_with(SOURCE_SUFFIX) {
        Ok(())
    } else {
        Err(CompileError::InvalidExtension {
            path: path.to_path_buf(),
        })
    }
}

/// `dir/prog.c` becomes `prog.s`, relative to the working directory.
pub fn output_path(source: &Path) -> PathBuf {
    let name = file_name(source);
    let stem = name.strip_suffix(SOURCE_SUFFIX).unwrap_or(&name);
    PathBuf::from(format!("{}{}", stem, ASM_SUFFIX))
}

pub fn read_source(path: &Path) -> Result<String, CompileError> {
    let mut file = File::open(path).map_err(io_error(path, "open"))?;
    let len = file.metadata().map_err(io_error(path, "stat"))?.len();
    let mut source = String::new();
    source
        .try_reserve(len as usize)
        .map_err(|source| CompileError::Allocation {
            path: path.to_path_buf(),
            source,
        })?;
    file.read_to_string(&mut source)
        .map_err(io_error(path, "read"))?;
    debug!(path = %path.display(), bytes = source.len(), "read source");
    Ok(source)
}

/// Writes through a sibling temporary file so a failed run never leaves a
/// truncated `.s` behind.
pub fn write_output(path: &Path, contents: &str) -> Result<(), CompileError> {
    let tmp = path.with_file_name(format!(".{}.tmp", file_name(path)));
    if let Err(err) = fs::write(&tmp, contents) {
        let _ = fs::remove_file(&tmp);
        return Err(io_error(&tmp, "write")(err));
    }
    if let Err(err) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(io_error(path, "write")(err));
    }
    Ok(())
}

/// Compiles `input` and writes the assembly, returning where it went.
pub fn run(input: &Path, output: Option<&Path>) -> Result<PathBuf, CompileError> {
    check_source_path(input)?;
    let source = read_source(input)?;
    let asm = crate::compile(&input.display().to_string(), source)?;
    let output = output.map_or_else(|| output_path(input), Path::to_path_buf);
    write_output(&output, &asm)?;
    info!(input = %input.display(), output = %output.display(), "wrote assembly");
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("retcc-driver-{}-{}", std::process::id(), name));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn accepts_only_c_sources() {
        assert!(check_source_path(Path::new("prog.c")).is_ok());
        assert!(check_source_path(Path::new("dir/sub/prog.c")).is_ok());
        assert!(matches!(
            check_source_path(Path::new("prog.cc")),
            Err(CompileError::InvalidExtension { .. })
        ));
        assert!(check_source_path(Path::new("prog.h")).is_err());
        assert!(check_source_path(Path::new("prog")).is_err());
        assert!(check_source_path(Path::new(".c")).is_err());
    }

    #[test]
    fn output_lands_next_to_the_working_directory() {
        assert_eq!(output_path(Path::new("prog.c")), PathBuf::from("prog.s"));
        assert_eq!(
            output_path(Path::new("/tmp/tests/stage_1/return_2.c")),
            PathBuf::from("return_2.s")
        );
    }

    #[test]
    fn missing_source_is_an_io_error() {
        let dir = scratch_dir("missing");
        let err = read_source(&dir.join("nope.c")).unwrap_err();
        assert!(matches!(err, CompileError::Io { action: "open", .. }));
    }

    #[test]
    fn reads_the_whole_file() {
        let dir = scratch_dir("read");
        let path = dir.join("prog.c");
        fs::write(&path, "int main() {\n    return 2;\n}\n").unwrap();
        assert_eq!(read_source(&path).unwrap(), "int main() {\n    return 2;\n}\n");
    }

    #[test]
    fn write_output_replaces_and_cleans_up() {
        let dir = scratch_dir("write");
        let path = dir.join("prog.s");
        fs::write(&path, "stale").unwrap();
        write_output(&path, "    ret\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "    ret\n");
        assert!(!dir.join(".prog.s.tmp").exists());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn failed_write_removes_the_temporary_file() {
        let dir = scratch_dir("write_fail");
        let path = dir.join("prog.s");
        let tmp = dir.join(".prog.s.tmp");
        let _ = fs::remove_file(&tmp);
        // every write to /dev/full fails with ENOSPC after the open succeeds
        std::os::unix::fs::symlink("/dev/full", &tmp).unwrap();

        let err = write_output(&path, "    ret\n").unwrap_err();

        assert!(matches!(err, CompileError::Io { action: "write", .. }));
        assert!(fs::symlink_metadata(&tmp).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn run_with_explicit_output() {
        let dir = scratch_dir("run");
        let input = dir.join("prog.c");
        let output = dir.join("out.s");
        fs::write(&input, "int main() { return 1 + 2; }").unwrap();
        assert_eq!(run(&input, Some(&output)).unwrap(), output);
        let asm = fs::read_to_string(&output).unwrap();
        assert!(asm.contains("addl %ecx, %eax"));
    }

    #[test]
    fn failed_run_writes_nothing() {
        let dir = scratch_dir("fail");
        let input = dir.join("bad.c");
        let output = dir.join("bad.s");
        fs::write(&input, "int main() { return ; }").unwrap();
        assert!(matches!(
            run(&input, Some(&output)),
            Err(CompileError::Parse(_))
        ));
        assert!(!output.exists());
    }
}
