//! Interactive terminal prompts.
//!
//! All prompts are generic over their input and output so they can be driven
//! from byte buffers in tests. Answers are read one line at a time with the
//! line terminator stripped. End of input counts as an empty answer.

use std::io::{self, BufRead, Write};

/// Exact text the user types to confirm a destructive or important step
pub const CONFIRMATION_WORD: &str = "Confirm";

const PASSWORD_ATTEMPTS: usize = 3;

const ENCRYPT_NOW_TEXT: &str = "Your wallet is currently UNENCRYPTED!

It is *highly* recommended that you encrypt your wallet before proceeding any further.

Encrypt it now?:";

const RESTORE_NOW_TEXT: &str = "Warning - This will overwrite your existing wallet.dat file and re-sync the blockchain!

It will take a while for your restored wallet to sync and display any funds.

Restore wallet now?:";

/// Shown before the recovery seed is displayed or saved
pub const SEED_WARNING_TEXT: &str = "A recovery seed can be used to recover your wallet, should anything happen to this computer.

It's a good idea to have more than one and keep each in a safe place, other than your computer.";

/// Answer to the seed-recovery reminder menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedRecoveryChoice {
    Display,
    Confirm,
    MoveOn,
    Other(String),
}

impl SeedRecoveryChoice {
    fn parse(answer: &str) -> Self {
        match answer.trim().to_lowercase().as_str() {
            "d" => SeedRecoveryChoice::Display,
            "c" => SeedRecoveryChoice::Confirm,
            "m" => SeedRecoveryChoice::MoveOn,
            _ => SeedRecoveryChoice::Other(answer.to_string()),
        }
    }
}

/// Question/answer session over a reader and writer
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<io::StdinLock<'static>, io::Stdout> {
    /// Prompter on the process's stdin and stdout
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn ask(&mut self, question: &str) -> io::Result<String> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;

        let mut line = String::new();
        self.input.read_line(&mut line)?;
        let answer_len = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(answer_len);
        Ok(line)
    }

    /// Ask a y/n question; only `y` or `yes` (any case) count as yes
    pub fn yes_no(&mut self, question: &str) -> io::Result<bool> {
        let answer = self.ask(&format!("{} (y/n)", question))?;
        Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
    }

    /// Ask for a new wallet password twice.
    ///
    /// Gives the user three tries to type matching passwords; returns `None`
    /// if they never match.
    pub fn new_wallet_password(&mut self) -> io::Result<Option<String>> {
        for _ in 0..PASSWORD_ATTEMPTS {
            let first = self.ask("\nPlease enter a password to encrypt your wallet: ")?;
            let second = self.ask("\nNow please re-enter your password: ")?;
            if first == second {
                return Ok(Some(first));
            }
            writeln!(self.output, "\nThe passwords don't match, please try again...")?;
        }
        Ok(None)
    }

    pub fn unlock_password(&mut self) -> io::Result<String> {
        self.ask("\nPlease enter your wallet encryption password: ")
    }

    /// Remind the user that their recovery seed is not confirmed as backed up
    pub fn seed_recovery_choice(&mut self) -> io::Result<SeedRecoveryChoice> {
        writeln!(self.output, "\n\n*** WARNING ***\n")?;
        writeln!(
            self.output,
            "You haven't provided confirmation that you've backed up your recovery seed!\n"
        )?;
        writeln!(
            self.output,
            "This is *extremely* important as it's the only way of recovering your wallet in the future\n"
        )?;
        writeln!(
            self.output,
            "To (d)isplay your recovery seed now press: d, to (c)onfirm that you've backed it up press: c, or to (m)ove on, press: m\n"
        )?;
        let answer = self.ask("Please enter: [d/c/m] ")?;
        Ok(SeedRecoveryChoice::parse(&answer))
    }

    /// Require the exact confirmation word before recording a seed backup
    pub fn confirm_seed_stored(&mut self) -> io::Result<bool> {
        let answer = self.ask(&format!("Please enter the response: {}\n", CONFIRMATION_WORD))?;
        Ok(answer == CONFIRMATION_WORD)
    }

    pub fn encrypt_wallet_now(&mut self) -> io::Result<bool> {
        self.yes_no(ENCRYPT_NOW_TEXT)
    }

    pub fn restore_wallet_now(&mut self) -> io::Result<bool> {
        self.yes_no(RESTORE_NOW_TEXT)
    }

    /// Require the exact confirmation word before uninstalling `app_name`
    pub fn confirm_uninstall(&mut self, app_name: &str) -> io::Result<bool> {
        let answer = self.ask(&format!(
            "This will remove {} and its coin binaries. To continue type: {}\n",
            app_name, CONFIRMATION_WORD
        ))?;
        Ok(answer == CONFIRMATION_WORD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_yes_no() {
        assert!(prompter("y\n").yes_no("Continue?").unwrap());
        assert!(prompter("YES\r\n").yes_no("Continue?").unwrap());
        assert!(!prompter("n\n").yes_no("Continue?").unwrap());
        assert!(!prompter("").yes_no("Continue?").unwrap());

        let mut p = prompter("y\n");
        p.yes_no("Continue?").unwrap();
        assert_eq!(String::from_utf8(p.into_output()).unwrap(), "Continue? (y/n)");
    }

    #[test]
    fn test_new_password_matches_on_second_try() {
        let mut p = prompter("one\ntwo\nsecret\nsecret\n");
        assert_eq!(p.new_wallet_password().unwrap(), Some("secret".to_string()));
        let output = String::from_utf8(p.into_output()).unwrap();
        assert_eq!(output.matches("don't match").count(), 1);
    }

    #[test]
    fn test_new_password_gives_up_after_three_mismatches() {
        let mut p = prompter("a\nb\nc\nd\ne\nf\nsecret\nsecret\n");
        assert_eq!(p.new_wallet_password().unwrap(), None);
    }

    #[test]
    fn test_seed_recovery_choice() {
        assert_eq!(prompter("d\n").seed_recovery_choice().unwrap(), SeedRecoveryChoice::Display);
        assert_eq!(prompter("C\n").seed_recovery_choice().unwrap(), SeedRecoveryChoice::Confirm);
        assert_eq!(prompter("m\n").seed_recovery_choice().unwrap(), SeedRecoveryChoice::MoveOn);
        assert_eq!(
            prompter("x\n").seed_recovery_choice().unwrap(),
            SeedRecoveryChoice::Other("x".to_string())
        );
    }

    #[test]
    fn test_confirmation_is_exact() {
        assert!(prompter("Confirm\n").confirm_seed_stored().unwrap());
        assert!(!prompter("confirm\n").confirm_seed_stored().unwrap());
        assert!(!prompter("Confirm \n").confirm_uninstall("GoDivi").unwrap());
        assert!(prompter("Confirm\r\n").confirm_uninstall("GoDivi").unwrap());
    }

    #[test]
    fn test_unlock_password_strips_newline() {
        assert_eq!(prompter("hunter2\n").unlock_password().unwrap(), "hunter2");
    }
}
