//! Bash, also registered as `shell`
//!
//! Strings, here-documents and command substitutions nest into each other:
//! a string may contain `$(...)`, which may contain more strings. The
//! command substitution grammar is therefore registered under its own name
//! and referenced by name from the interpolation grammar, which breaks the
//! cycle.

use super::{alternation, keywords};
use crate::error::GrammarError;
use crate::grammar::{Grammar, GrammarRef, Rule};
use crate::registry::GrammarRegistry;
use std::sync::Arc;

pub const NAME: &str = "bash";
pub const ALIASES: &[&str] = &["shell"];

/// Grammar used inside `$(...)` and backticks
pub const COMMAND_SUBSTITUTION: &str = "bash/command-substitution";

const ENV_VARS: &str = "BASH|BASHOPTS|BASH_ALIASES|BASH_ARGC|BASH_ARGV|BASH_CMDS|BASH_COMPLETION_COMPAT_DIR|BASH_LINENO|BASH_REMATCH|BASH_SOURCE|BASH_VERSINFO|BASH_VERSION|COLORTERM|COLUMNS|COMP_WORDBREAKS|DBUS_SESSION_BUS_ADDRESS|DEFAULTS_PATH|DESKTOP_SESSION|DIRSTACK|DISPLAY|EUID|GDMSESSION|GDM_LANG|GNOME_KEYRING_CONTROL|GNOME_KEYRING_PID|GPG_AGENT_INFO|GROUPS|HISTCONTROL|HISTFILE|HISTFILESIZE|HISTSIZE|HOME|HOSTNAME|HOSTTYPE|IFS|INSTANCE|JOB|LANG|LANGUAGE|LC_ADDRESS|LC_ALL|LC_IDENTIFICATION|LC_MEASUREMENT|LC_MONETARY|LC_NAME|LC_NUMERIC|LC_PAPER|LC_TELEPHONE|LC_TIME|LESSCLOSE|LESSOPEN|LINES|LOGNAME|LS_COLORS|MACHTYPE|MAILCHECK|MANDATORY_PATH|NO_AT_BRIDGE|OLDPWD|OPTERR|OPTIND|ORBIT_SOCKETDIR|OSTYPE|PAPERSIZE|PATH|PIPESTATUS|PPID|PS1|PS2|PS3|PS4|PWD|RANDOM|REPLY|SECONDS|SELINUX_INIT|SESSION|SESSIONTYPE|SESSION_MANAGER|SHELL|SHELLOPTS|SHLVL|SSH_AUTH_SOCK|TERM|UID|UPSTART_EVENTS|UPSTART_INSTANCE|UPSTART_JOB|UPSTART_SESSION|USER|WINDOWID|XAUTHORITY|XDG_CONFIG_DIRS|XDG_CURRENT_DESKTOP|XDG_DATA_DIRS|XDG_GREETER_DATA_DIR|XDG_MENU_PREFIX|XDG_RUNTIME_DIR|XDG_SEAT|XDG_SEAT_PATH|XDG_SESSION_DESKTOP|XDG_SESSION_ID|XDG_SESSION_PATH|XDG_SESSION_TYPE|XDG_VTNR|XMODIFIERS";

const COMMANDS: &str = "add|apropos|apt|aptitude|apt-cache|apt-get|aspell|automysqlbackup|awk|basename|bash|bc|bconsole|bg|bzip2|cal|cat|cfdisk|chgrp|chkconfig|chmod|chown|chroot|cksum|clear|cmp|column|comm|composer|cp|cron|crontab|csplit|curl|cut|date|dc|dd|ddrescue|debootstrap|df|diff|diff3|dig|dir|dircolors|dirname|dirs|dmesg|du|egrep|eject|env|ethtool|expand|expect|expr|fdformat|fdisk|fg|fgrep|file|find|fmt|fold|format|free|fsck|ftp|fuser|gawk|git|gparted|grep|groupadd|groupdel|groupmod|groups|grub-mkconfig|gzip|halt|head|hg|history|host|hostname|htop|iconv|id|ifconfig|ifdown|ifup|import|ip|jobs|join|kill|killall|less|link|ln|locate|logname|logrotate|look|lpc|lpr|lprint|lprintd|lprintq|lprm|ls|lsof|lynx|make|man|mc|mdadm|mkconfig|mkdir|mke2fs|mkfifo|mkfs|mkisofs|mknod|mkswap|mmv|more|most|mount|mtools|mtr|mutt|mv|nano|nc|netstat|nice|nl|nohup|notify-send|npm|nslookup|op|open|parted|passwd|paste|pathchk|ping|pkill|pnpm|popd|pr|printcap|printenv|ps|pushd|pv|quota|quotacheck|quotactl|ram|rar|rcp|reboot|remsync|rename|renice|rev|rm|rmdir|rpm|rsync|scp|screen|sdiff|sed|sendmail|seq|service|sftp|sh|shellcheck|shuf|shutdown|sleep|slocate|sort|split|ssh|stat|strace|su|sudo|sum|suspend|swapon|sync|tac|tail|tar|tee|time|timeout|top|touch|tr|traceroute|tsort|tty|umount|uname|unexpand|uniq|units|unrar|unshar|unzip|update-grub|uptime|useradd|userdel|usermod|users|uudecode|uuencode|v|vdir|vi|vim|virsh|vmstat|wait|watch|wc|wget|whereis|which|who|whoami|write|xargs|xdg-open|yarn|yes|zenity|zip|zsh|zypper";

const EXTRA_COMMANDS: &str = "nelua|luarocks|pacman";

const KEYWORDS: &str = "if|then|else|elif|fi|for|while|in|case|esac|function|select|do|done|until";

const BUILTINS: &str = ".|:|break|cd|continue|eval|exec|exit|export|getopts|hash|pwd|readonly|return|shift|test|times|trap|umask|unset|alias|bind|builtin|caller|command|declare|echo|enable|help|let|local|logout|mapfile|printf|read|readarray|source|type|typeset|ulimit|unalias|set|shopt";

/// Entries of `bash` that are also active inside command substitutions
const SUBSTITUTED: &[&str] = &[
    "comment",
    "function-name",
    "for-or-select",
    "assign-left",
    "string",
    "environment",
    "function",
    "keyword",
    "builtin",
    "boolean",
    "file-descriptor",
    "operator",
    "punctuation",
    "number",
];

/// Start of a command: line start, separator or process substitution
const COMMAND_START: &str = r"(^|[\s;|&]|[<>]\()";

pub fn register(registry: &mut GrammarRegistry) -> Result<(), GrammarError> {
    let interpolation = Arc::new(interpolation()?);
    let bash = grammar(&interpolation)?;

    let mut substitution = Grammar::builder()
        .rule("variable", Rule::parse(r"^\$\(|^`|\)$|`$")?)
        .build();
    for name in SUBSTITUTED {
        if let Some(rules) = bash.rules(name) {
            substitution.set(*name, rules.to_vec());
        }
    }

    registry.define(NAME, bash);
    registry.define(COMMAND_SUBSTITUTION, substitution);
    for alias in ALIASES {
        registry.alias_language(*alias, NAME)?;
    }
    Ok(())
}

/// A word in command position, e.g. `ls` in `x; ls -l`
fn command(words: &str) -> Result<Rule, GrammarError> {
    Ok(Rule::parse(&format!(
        r"{COMMAND_START}(?:{})(?=$|[)\s;|&])",
        alternation(words)
    ))?
    .lookbehind())
}

/// Expansions inside double quotes and unquoted here-documents
fn interpolation() -> Result<Grammar, GrammarError> {
    Ok(Grammar::builder()
        .rule(
            "environment",
            Rule::parse(&format!(r"\${}", keywords(ENV_VARS)))?.alias("constant"),
        )
        .rules("variable", variables()?)
        .rule(
            "entity",
            Rule::parse(
                r#"\\(?:[abceEfnrtv\\"]|O?[0-7]{1,3}|x[0-9a-fA-F]{1,2}|u[0-9a-fA-F]{4}|U[0-9a-fA-F]{8})"#,
            )?,
        )
        .build())
}

fn variables() -> Result<Vec<Rule>, GrammarError> {
    let arithmetic = Grammar::builder()
        .rules(
            "variable",
            vec![
                Rule::parse(r"(^\$\(\([\s\S]+)\)\)")?.lookbehind(),
                Rule::parse(r"^\$\(\(")?,
            ],
        )
        .rule(
            "number",
            Rule::parse(r"\b0x[\dA-Fa-f]+\b|(?:\b\d+\.?\d*|\B\.\d+)(?:[Ee]-?\d+)?")?,
        )
        .rule(
            "operator",
            Rule::parse(
                r"--?|-=|\+\+?|\+=|!=?|~|\*\*?|\*=|/=?|%=?|<<=?|>>=?|<=?|>=?|==?|&&?|&=|\^=?|\|\|?|\|=|\?|:",
            )?,
        )
        .rule("punctuation", Rule::parse(r"\(\(?|\)\)?|,|;")?)
        .build();

    let braces = Grammar::builder()
        .rule("operator", Rule::parse(r":[-=?+]?|[!/]|##?|%%?|\^\^?|,,?")?)
        .rule("punctuation", Rule::parse(r"[\[\]]")?)
        .rule(
            "environment",
            Rule::parse(&format!(r"(\{{){}", keywords(ENV_VARS)))?
                .lookbehind()
                .alias("constant"),
        )
        .build();

    Ok(vec![
        Rule::parse(r"\$?\(\([\s\S]+?\)\)")?
            .greedy()
            .inside(arithmetic),
        Rule::parse(r"\$\((?:\([^)]+\)|[^()])+\)|`[^`]+`")?
            .greedy()
            .inside(GrammarRef::named(COMMAND_SUBSTITUTION)),
        Rule::parse(r"\$\{[^}]+\}")?.greedy().inside(braces),
        Rule::parse(r"\$(?:\w+|[#?*!@$])")?,
    ])
}

fn grammar(interpolation: &Arc<Grammar>) -> Result<Grammar, GrammarError> {
    let assign_inside = Grammar::builder()
        .rule(
            "environment",
            Rule::parse(&format!("{COMMAND_START}{}", keywords(ENV_VARS)))?
                .lookbehind()
                .alias("constant"),
        )
        .build();

    let operator_inside = Grammar::builder()
        .rule("file-descriptor", Rule::parse(r"^\d")?.alias("important"))
        .build();

    Ok(Grammar::builder()
        .rule("shebang", Rule::parse(r"^#!\s*/.*")?.alias("important"))
        .rule("comment", Rule::parse(r##"(^|[^"{\\$])#.*"##)?.lookbehind())
        .rules(
            "function-name",
            vec![
                Rule::parse(r"(\bfunction\s+)\w+(?=(?:\s*\(?:\s*\))?\s*\{)")?
                    .lookbehind()
                    .alias("function"),
                Rule::parse(r"\b\w+(?=\s*\(\s*\)\s*\{)")?.alias("function"),
            ],
        )
        .rule(
            "for-or-select",
            Rule::parse(r"(\b(?:for|select)\s+)\w+(?=\s+in\s)")?
                .lookbehind()
                .alias("variable"),
        )
        .rule(
            "assign-left",
            Rule::parse(&format!(r"{COMMAND_START}\w+(?=\+?=)"))?
                .lookbehind()
                .alias("variable")
                .inside(assign_inside),
        )
        .rules(
            "string",
            vec![
                Rule::parse(r"((?:^|[^<])<<-?\s*)(\w+?)\s*(?:\r?\n|\r)[\s\S]*?(?:\r?\n|\r)\2")?
                    .lookbehind()
                    .greedy()
                    .inside(Arc::clone(interpolation)),
                Rule::parse(
                    r#"((?:^|[^<])<<-?\s*)(["'])(\w+)\2\s*(?:\r?\n|\r)[\s\S]*?(?:\r?\n|\r)\3"#,
                )?
                .lookbehind()
                .greedy(),
                Rule::parse(r#"(^|[^\\](?:\\\\)*)(["'])(?:\\[\s\S]|\$\([^)]+\)|`[^`]+`|(?!\2)[^\\])*\2"#)?
                    .lookbehind()
                    .greedy()
                    .inside(Arc::clone(interpolation)),
            ],
        )
        .rule(
            "environment",
            Rule::parse(&format!(r"\$?{}", keywords(ENV_VARS)))?.alias("constant"),
        )
        .rules("variable", variables()?)
        .rule("function", command(COMMANDS)?)
        .rule("extra-functions", command(EXTRA_COMMANDS)?.alias("function"))
        .rule("keyword", command(KEYWORDS)?)
        .rule("builtin", command(BUILTINS)?.alias("class-name"))
        .rule("boolean", command("true|false")?)
        .rule("file-descriptor", Rule::parse(r"\B&\d\b")?.alias("important"))
        .rule(
            "operator",
            Rule::parse(r"\d?<>|>\||\+=|==?|!=?|=~|<<[<-]?|[&\d]?>>|\d?[<>]&?|&[>&]?|\|[&|]?|<=?|>=?")?
                .inside(operator_inside),
        )
        .rule("punctuation", Rule::parse(r"\$?\(\(?|\)\)?|\.\.|[{}\[\];\\]")?)
        .rule(
            "number",
            Rule::parse(r"(^|\s)(?:[1-9]\d*|0)(?:[.,]\d+)?\b")?.lookbehind(),
        )
        .build())
}
