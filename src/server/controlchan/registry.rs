//! The table of commands the server knows about. It is built at compile time and never changes:
//! every entry names the directive and its aliases, the help text, whether it may be used before
//! logging in and the FEAT token it contributes.

use super::{commands, handler::CommandHandler};
use crate::storage::StorageBackend;

/// The commands the server recognizes, aliases folded into one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Directive {
    Abor,
    Acct,
    Allo,
    Appe,
    Auth,
    Cdup,
    Cwd,
    Dele,
    Eprt,
    Epsv,
    Feat,
    Help,
    List,
    Mdtm,
    Mkd,
    Mode,
    Nlst,
    Noop,
    Opts,
    Pass,
    Pasv,
    Pbsz,
    Port,
    Prot,
    Pwd,
    Quit,
    Rein,
    Rest,
    Retr,
    Rmd,
    Rnfr,
    Rnto,
    Site,
    Size,
    Smnt,
    Stat,
    Stor,
    Stou,
    Stru,
    Syst,
    Type,
    User,
}

#[derive(Debug)]
pub(crate) struct CommandSpec {
    pub names: &'static [&'static str],
    pub directive: Directive,
    /// `{{cmd}}` stands for the name the client used.
    pub syntax: &'static str,
    pub description: &'static str,
    pub no_auth: bool,
    pub feat: Option<&'static str>,
}

impl CommandSpec {
    const fn new(names: &'static [&'static str], directive: Directive, syntax: &'static str, description: &'static str) -> Self {
        CommandSpec {
            names,
            directive,
            syntax,
            description,
            no_auth: false,
            feat: None,
        }
    }

    const fn no_auth(mut self) -> Self {
        self.no_auth = true;
        self
    }

    const fn feat(mut self, feat: &'static str) -> Self {
        self.feat = Some(feat);
        self
    }

    /// The syntax line for HELP, with the placeholder filled in.
    pub(crate) fn usage(&self, name: &str) -> String {
        self.syntax.replace("{{cmd}}", name)
    }
}

static REGISTRY: &[CommandSpec] = &[
    CommandSpec::new(&["ABOR"], Directive::Abor, "{{cmd}}", "Abort an active file transfer"),
    CommandSpec::new(&["ALLO"], Directive::Allo, "{{cmd}}", "Allocate sufficient disk space to receive a file"),
    CommandSpec::new(&["APPE"], Directive::Appe, "{{cmd}} <path>", "Append to a file"),
    CommandSpec::new(&["AUTH"], Directive::Auth, "{{cmd}} <type>", "Set authentication mechanism")
        .no_auth()
        .feat("AUTH TLS"),
    CommandSpec::new(&["CDUP", "XCUP"], Directive::Cdup, "{{cmd}}", "Change to Parent Directory"),
    CommandSpec::new(&["CWD", "XCWD"], Directive::Cwd, "{{cmd}} <path>", "Change working directory"),
    CommandSpec::new(&["DELE"], Directive::Dele, "{{cmd}} <path>", "Delete file"),
    CommandSpec::new(&["FEAT"], Directive::Feat, "{{cmd}}", "Get the feature list implemented by the server").no_auth(),
    CommandSpec::new(
        &["HELP"],
        Directive::Help,
        "{{cmd}} [<command>]",
        "Returns usage documentation on a command if specified, else a general help document is returned",
    )
    .no_auth(),
    CommandSpec::new(
        &["LIST"],
        Directive::List,
        "{{cmd}} [<path>]",
        "Returns information of a file or directory if specified, else information of the current working directory is returned",
    ),
    CommandSpec::new(&["MDTM"], Directive::Mdtm, "{{cmd}} <path>", "Return the last-modified time of a specified file").feat("MDTM"),
    CommandSpec::new(&["MKD", "XMKD"], Directive::Mkd, "{{cmd}} <path>", "Make directory"),
    CommandSpec::new(&["MODE"], Directive::Mode, "{{cmd}} <mode>", "Sets the transfer mode (Stream, Block, or Compressed)"),
    CommandSpec::new(&["NLST"], Directive::Nlst, "{{cmd}} [<path>]", "Returns a list of file names in a specified directory"),
    CommandSpec::new(&["NOOP"], Directive::Noop, "{{cmd}}", "No operation").no_auth(),
    CommandSpec::new(&["OPTS"], Directive::Opts, "{{cmd}}", "Select options for a feature"),
    CommandSpec::new(&["PASS"], Directive::Pass, "{{cmd}} <password>", "Authentication password").no_auth(),
    CommandSpec::new(&["PASV"], Directive::Pasv, "{{cmd}}", "Initiate passive mode"),
    CommandSpec::new(&["PORT"], Directive::Port, "{{cmd}} <x>,<x>,<x>,<x>,<y>,<y>", "Specifies an address and port to which the server should connect"),
    CommandSpec::new(&["PWD", "XPWD"], Directive::Pwd, "{{cmd}}", "Print current working directory"),
    CommandSpec::new(&["QUIT"], Directive::Quit, "{{cmd}}", "Disconnect").no_auth(),
    CommandSpec::new(&["REST"], Directive::Rest, "{{cmd}} <byte-count>", "Restart transfer from the specified point. Resets after any STORE or RETRIEVE")
        .feat("REST STREAM"),
    CommandSpec::new(&["RETR"], Directive::Retr, "{{cmd}} <path>", "Retrieve a file"),
    CommandSpec::new(&["RMD", "XRMD"], Directive::Rmd, "{{cmd}} <path>", "Remove a directory"),
    CommandSpec::new(&["RNFR"], Directive::Rnfr, "{{cmd}} <name>", "Rename from"),
    CommandSpec::new(&["RNTO"], Directive::Rnto, "{{cmd}} <name>", "Rename to"),
    CommandSpec::new(&["SITE"], Directive::Site, "{{cmd}} <subVerb> [...<subParams>]", "Sends site specific commands to remote server"),
    CommandSpec::new(&["SIZE"], Directive::Size, "{{cmd}} <path>", "Return the size of a file").feat("SIZE"),
    CommandSpec::new(&["STAT"], Directive::Stat, "{{cmd}} [<path>]", "Returns the current status"),
    CommandSpec::new(&["STOR"], Directive::Stor, "{{cmd}} <path>", "Store data as a file at the server site"),
    CommandSpec::new(&["STOU"], Directive::Stou, "{{cmd}}", "Store file uniquely"),
    CommandSpec::new(&["STRU"], Directive::Stru, "{{cmd}} <structure>", "Set file transfer structure"),
    CommandSpec::new(&["SYST"], Directive::Syst, "{{cmd}}", "Return system type").no_auth(),
    CommandSpec::new(&["TYPE"], Directive::Type, "{{cmd}} <mode>", "Set the transfer mode, binary (I) or ascii (A)"),
    CommandSpec::new(&["USER"], Directive::User, "{{cmd}} <username>", "Authentication username").no_auth(),
    CommandSpec::new(&["PBSZ"], Directive::Pbsz, "{{cmd}}", "Protection Buffer Size").no_auth().feat("PBSZ"),
    CommandSpec::new(&["PROT"], Directive::Prot, "{{cmd}}", "Data Channel Protection Level").no_auth().feat("PROT"),
    CommandSpec::new(&["EPRT"], Directive::Eprt, "{{cmd}} |<protocol>|<address>|<port>|", "Specifies an address and port to which the server should connect")
        .feat("EPRT"),
    CommandSpec::new(&["EPSV"], Directive::Epsv, "{{cmd}} [<protocol>]", "Initiate passive mode").feat("EPSV"),
    CommandSpec::new(&["ACCT"], Directive::Acct, "{{cmd}} <account-info>", "Account information"),
    CommandSpec::new(&["SMNT"], Directive::Smnt, "{{cmd}} <path>", "Structure mount"),
    CommandSpec::new(&["REIN"], Directive::Rein, "{{cmd}}", "Reinitialize the session"),
];

static SITE_REGISTRY: &[CommandSpec] = &[
    CommandSpec::new(&["CHMOD"], Directive::Site, "SITE {{cmd}} <mode> <path>", "Change the permission bits of a file"),
    CommandSpec::new(&["HELP"], Directive::Site, "SITE {{cmd}}", "List the SITE commands"),
];

/// Finds the entry for a directive or one of its aliases.
pub(crate) fn lookup(name: &str) -> Option<&'static CommandSpec> {
    REGISTRY.iter().find(|spec| spec.names.contains(&name))
}

/// Finds the entry for a SITE subcommand.
pub(crate) fn lookup_site(name: &str) -> Option<&'static CommandSpec> {
    SITE_REGISTRY.iter().find(|spec| spec.names.contains(&name))
}

/// Every name the server answers to, aliases included, in registration order.
pub(crate) fn names() -> impl Iterator<Item = &'static str> {
    REGISTRY.iter().flat_map(|spec| spec.names.iter().copied())
}

pub(crate) fn site_names() -> impl Iterator<Item = &'static str> {
    SITE_REGISTRY.iter().flat_map(|spec| spec.names.iter().copied())
}

/// The FEAT tokens: `UTF8` and whatever the commands declare, sorted and without duplicates.
pub(crate) fn features() -> Vec<&'static str> {
    let mut feats: Vec<&'static str> = REGISTRY.iter().filter_map(|spec| spec.feat).collect();
    feats.push("UTF8");
    feats.sort_unstable();
    feats.dedup();
    feats
}

impl Directive {
    /// The handler bound to this directive. ACCT, SMNT and REIN are recognized but have none.
    pub(crate) fn handler<S>(self) -> Option<Box<dyn CommandHandler<S>>>
    where
        S: StorageBackend + 'static,
    {
        let handler: Box<dyn CommandHandler<S>> = match self {
            Directive::Abor => Box::new(commands::Abor),
            Directive::Allo => Box::new(commands::Allo),
            Directive::Appe => Box::new(commands::Stor::append()),
            Directive::Auth => Box::new(commands::Auth),
            Directive::Cdup => Box::new(commands::Cdup),
            Directive::Cwd => Box::new(commands::Cwd),
            Directive::Dele => Box::new(commands::Dele),
            Directive::Eprt => Box::new(commands::Eprt),
            Directive::Epsv => Box::new(commands::Epsv),
            Directive::Feat => Box::new(commands::Feat),
            Directive::Help => Box::new(commands::Help),
            Directive::List => Box::new(commands::List::long()),
            Directive::Mdtm => Box::new(commands::Mdtm),
            Directive::Mkd => Box::new(commands::Mkd),
            Directive::Mode => Box::new(commands::Mode),
            Directive::Nlst => Box::new(commands::List::names_only()),
            Directive::Noop => Box::new(commands::Noop),
            Directive::Opts => Box::new(commands::Opts),
            Directive::Pass => Box::new(commands::Pass),
            Directive::Pasv => Box::new(commands::Pasv),
            Directive::Pbsz => Box::new(commands::Pbsz),
            Directive::Port => Box::new(commands::Port),
            Directive::Prot => Box::new(commands::Prot),
            Directive::Pwd => Box::new(commands::Pwd),
            Directive::Quit => Box::new(commands::Quit),
            Directive::Rest => Box::new(commands::Rest),
            Directive::Retr => Box::new(commands::Retr),
            Directive::Rmd => Box::new(commands::Rmd),
            Directive::Rnfr => Box::new(commands::Rnfr),
            Directive::Rnto => Box::new(commands::Rnto),
            Directive::Site => Box::new(commands::Site),
            Directive::Size => Box::new(commands::Size),
            Directive::Stat => Box::new(commands::Stat),
            Directive::Stor => Box::new(commands::Stor::overwrite()),
            Directive::Stou => Box::new(commands::Stou),
            Directive::Stru => Box::new(commands::Stru),
            Directive::Syst => Box::new(commands::Syst),
            Directive::Type => Box::new(commands::Type),
            Directive::User => Box::new(commands::User),
            Directive::Acct | Directive::Smnt | Directive::Rein => return None,
        };
        Some(handler)
    }
}
