//! Windows-specific implementation.

#![allow(unsafe_code)]

use once_cell::sync::Lazy;
use std::{
    ffi::OsStr,
    fs::File,
    mem::size_of,
    os::windows::{ffi::OsStrExt, io::AsRawHandle},
};
use winapi::{
    shared::{
        minwindef::{FARPROC, HMODULE},
        ntdef::{HANDLE, NTSTATUS, PVOID, ULONG},
    },
    um::libloaderapi::{GetModuleHandleW, GetProcAddress},
};

use super::{Backend, NativeError, Reserve};

/// `FS_INFORMATION_CLASS::FileFsSizeInformation`.
const FILE_FS_SIZE_INFORMATION: u32 = 3;

/// `FILE_INFORMATION_CLASS::FileAllocationInformation`.
const FILE_ALLOCATION_INFORMATION: u32 = 19;

type NtQueryVolumeInformationFile = unsafe extern "system" fn(
    file: HANDLE,
    io_status_block: *mut IoStatusBlock,
    fs_information: PVOID,
    length: ULONG,
    fs_information_class: u32,
) -> NTSTATUS;

type NtSetInformationFile = unsafe extern "system" fn(
    file: HANDLE,
    io_status_block: *mut IoStatusBlock,
    file_information: PVOID,
    length: ULONG,
    file_information_class: u32,
) -> NTSTATUS;

#[repr(C)]
#[derive(Debug, Default)]
#[allow(dead_code)]
struct IoStatusBlock {
    status: usize,
    information: usize,
}

#[repr(C)]
#[derive(Debug, Default)]
#[allow(dead_code)]
struct FileFsSizeInformation {
    total_allocation_units: i64,
    available_allocation_units: i64,
    sectors_per_allocation_unit: u32,
    bytes_per_sector: u32,
}

#[repr(C)]
#[derive(Debug, Default)]
struct FileAllocationInformation {
    allocation_size: i64,
}

/// The `ntdll.dll` entry points we need, resolved once per process.
struct Ntdll {
    query_volume_information_file: Option<NtQueryVolumeInformationFile>,
    set_information_file: Option<NtSetInformationFile>,
}

static NTDLL: Lazy<Ntdll> = Lazy::new(Ntdll::load);

impl Ntdll {
    /// Look up the entry points; the ones that are missing stay `None`.
    fn load() -> Self {
        let name: Vec<u16> = OsStr::new("ntdll.dll")
            .encode_wide()
            .chain(Some(0))
            .collect();
        // `ntdll.dll` is mapped into every process, so no need to load it.
        let module = unsafe { GetModuleHandleW(name.as_ptr()) };
        if module.is_null() {
            tracing::debug!(message = "ntdll.dll is not available");
            return Self {
                query_volume_information_file: None,
                set_information_file: None,
            };
        }

        let query = proc_address(module, b"NtQueryVolumeInformationFile\0");
        let set = proc_address(module, b"NtSetInformationFile\0");
        Self {
            query_volume_information_file: (!query.is_null()).then(|| unsafe {
                std::mem::transmute::<FARPROC, NtQueryVolumeInformationFile>(query)
            }),
            set_information_file: (!set.is_null()).then(|| unsafe {
                std::mem::transmute::<FARPROC, NtSetInformationFile>(set)
            }),
        }
    }
}

/// Resolve the `name` (nul-terminated) export of the `module`.
fn proc_address(module: HMODULE, name: &[u8]) -> FARPROC {
    debug_assert_eq!(name.last(), Some(&0));
    unsafe { GetProcAddress(module, name.as_ptr().cast()) }
}

/// Reserve the disk space in whole clusters via the file allocation
/// information.
///
/// This does not move the end of file: the storage is reserved, but the
/// reported file length stays as it was.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct AllocationInformation;

impl Reserve for AllocationInformation {
    const BACKEND: Backend = Backend::AllocationInformation;

    fn reserve(&self, file: &File, size: u64) -> Result<(), NativeError> {
        let Some(set_information_file) = NTDLL.set_information_file else {
            return Err(NativeError::Unsupported);
        };

        let allocation_size = allocation_size(size, cluster_size(file)?)
            .and_then(|allocation_size| i64::try_from(allocation_size).ok())
            .ok_or(NativeError::Unsupported)?;

        let mut io_status_block = IoStatusBlock::default();
        let mut allocation = FileAllocationInformation { allocation_size };
        cvt(unsafe {
            set_information_file(
                file.as_raw_handle() as HANDLE,
                &mut io_status_block,
                &mut allocation as *mut FileAllocationInformation as PVOID,
                size_of::<FileAllocationInformation>() as ULONG,
                FILE_ALLOCATION_INFORMATION,
            )
        })
    }
}

/// Query the allocation unit size of the filesystem the `file` is on.
fn cluster_size(file: &File) -> Result<u64, NativeError> {
    let Some(query_volume_information_file) = NTDLL.query_volume_information_file else {
        return Err(NativeError::Unsupported);
    };

    let mut io_status_block = IoStatusBlock::default();
    let mut fs_size = FileFsSizeInformation::default();
    cvt(unsafe {
        query_volume_information_file(
            file.as_raw_handle() as HANDLE,
            &mut io_status_block,
            &mut fs_size as *mut FileFsSizeInformation as PVOID,
            size_of::<FileFsSizeInformation>() as ULONG,
            FILE_FS_SIZE_INFORMATION,
        )
    })?;

    Ok(u64::from(fs_size.bytes_per_sector) * u64::from(fs_size.sectors_per_allocation_unit))
}

/// Round the `size` up to the whole clusters.
///
/// `None` when the cluster size is unknown or the result overflows.
fn allocation_size(size: u64, cluster_size: u64) -> Option<u64> {
    if cluster_size == 0 {
        return None;
    }
    let clusters = size.checked_add(cluster_size - 1)? / cluster_size;
    clusters.checked_mul(cluster_size)
}

/// Interpret the `NTSTATUS` of a system API call.
fn cvt(status: NTSTATUS) -> Result<(), NativeError> {
    if status >= 0 {
        return Ok(());
    }
    Err(NativeError::Failed(std::io::Error::new(
        std::io::ErrorKind::Other,
        format!("NTSTATUS {status:#010x}"),
    )))
}
