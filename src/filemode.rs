//! Permission-string rendering for the `perm_mode` record field.

const S_IFLNK: u32 = 0o120000;
const S_IFREG: u32 = 0o100000;
const S_IFBLK: u32 = 0o060000;
const S_IFDIR: u32 = 0o040000;
const S_IFCHR: u32 = 0o020000;
const S_IFIFO: u32 = 0o010000;

const S_ISUID: u32 = 0o4000;
const S_ISGID: u32 = 0o2000;
const S_ISVTX: u32 = 0o1000;

const S_IRUSR: u32 = 0o400;
const S_IWUSR: u32 = 0o200;
const S_IXUSR: u32 = 0o100;
const S_IRGRP: u32 = 0o040;
const S_IWGRP: u32 = 0o020;
const S_IXGRP: u32 = 0o010;
const S_IROTH: u32 = 0o004;
const S_IWOTH: u32 = 0o002;
const S_IXOTH: u32 = 0o001;

/// One entry per output column; the first matching `(mask, ch)` pair wins,
/// `'-'` if none matches.
const FILEMODE_TABLE: &[&[(u32, char)]] = &[
    &[
        (S_IFLNK, 'l'),
        (S_IFREG, '-'),
        (S_IFBLK, 'b'),
        (S_IFDIR, 'd'),
        (S_IFCHR, 'c'),
        (S_IFIFO, 'p'),
    ],
    &[(S_IRUSR, 'r')],
    &[(S_IWUSR, 'w')],
    &[(S_IXUSR | S_ISUID, 's'), (S_ISUID, 'S'), (S_IXUSR, 'x')],
    &[(S_IRGRP, 'r')],
    &[(S_IWGRP, 'w')],
    &[(S_IXGRP | S_ISGID, 's'), (S_ISGID, 'S'), (S_IXGRP, 'x')],
    &[(S_IROTH, 'r')],
    &[(S_IWOTH, 'w')],
    &[(S_IXOTH | S_ISVTX, 't'), (S_ISVTX, 'T'), (S_IXOTH, 'x')],
];

/// Convert a mode to a string of the form `-rwxr-xr-x`.
pub fn filemode(mode: u32) -> String {
    let mut out = String::with_capacity(FILEMODE_TABLE.len());
    for group in FILEMODE_TABLE {
        let mut ch = '-';
        for &(mask, c) in *group {
            if mode & mask == mask {
                ch = c;
                break;
            }
        }
        out.push(ch);
    }
    out
}
