#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use std::env;
use std::fs;
use std::path::PathBuf;

/// An isolated HOME with a UTC config and a fresh database.
pub struct TestEnv {
    pub home: PathBuf,
    pub db: String,
}

impl TestEnv {
    pub fn new(name: &str) -> Self {
        let home = env::temp_dir().join(format!("sitehours_{name}_home"));
        fs::remove_dir_all(&home).ok();
        let conf_dir = home.join(".sitehours");
        fs::create_dir_all(&conf_dir).expect("create config dir");

        let db = home.join("test.sqlite").to_string_lossy().to_string();
        let conf = format!(
            "database: {db}\ntimezone: UTC\nreport_epoch: 2025-09-01\ndocuments_dir: {}\n",
            home.join("documents").display()
        );
        fs::write(conf_dir.join("sitehours.conf"), conf).expect("write config");

        Self { home, db }
    }

    /// Command with HOME pointed at this environment and `--db` set.
    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("sitehours");
        cmd.env("HOME", &self.home)
            .env("APPDATA", &self.home)
            .env("NO_COLOR", "1")
            .args(["--db", &self.db]);
        cmd
    }

    pub fn init(&self) -> &Self {
        self.cmd().args(["--test", "init"]).assert().success();
        self
    }

    pub fn worker(&self, id: &str, first: &str, last: &str, status: &str) -> &Self {
        self.cmd()
            .args(["worker", "add", "--id", id, "--first", first, "--last", last])
            .assert()
            .success();
        if status != "under_review" {
            self.cmd()
                .args(["worker", "status", id, status])
                .assert()
                .success();
        }
        self
    }

    pub fn site(&self, name: &str) -> &Self {
        self.cmd()
            .args(["site", "add", "--name", name, "--company", "Byg ApS"])
            .assert()
            .success();
        self
    }

    pub fn join(&self, worker: &str, site: &str) -> &Self {
        self.cmd()
            .args(["worker", "join", worker, "--site", site])
            .assert()
            .success();
        self
    }

    pub fn shift(&self, worker: &str, site: &str, date: &str, start: &str, end: &str, brk: &str) -> &Self {
        self.cmd()
            .args([
                "entry", "add", "--worker", worker, "--site", site, "--date", date, "--start",
                start, "--end", end, "--break", brk,
            ])
            .assert()
            .success();
        self
    }

    /// Two approved workers and one pending, all on site #1 in week 2025W42,
    /// plus one approved shift on site #2. w3 joined both sites while approved
    /// and was then sent back to review.
    pub fn seeded(name: &str) -> Self {
        let env = Self::new(name);
        env.init()
            .site("Nordhavn")
            .site("Aarhus Ø")
            .worker("w1", "Anna", "Holm", "approved")
            .worker("w2", "Bo", "Berg", "approved")
            .worker("w3", "Carl", "Dahl", "approved")
            .join("w1", "1")
            .join("w2", "1")
            .join("w2", "2")
            .join("w3", "1")
            .join("w3", "2");
        env.cmd()
            .args(["worker", "status", "w3", "under_review"])
            .assert()
            .success();
        for day in 13..=17 {
            let date = format!("2025-10-{day}");
            env.shift("w1", "1", &date, "07:00", "16:00", "30");
        }
        env.shift("w1", "1", "2025-10-18", "08:00", "14:00", "0")
            .shift("w2", "1", "2025-10-14", "07:00", "15:00", "30")
            .shift("w3", "1", "2025-10-14", "07:00", "15:00", "0")
            .shift("w2", "2", "2025-10-21", "07:00", "11:00", "0");
        env
    }

    pub fn out(&self, file: &str) -> String {
        let p = self.home.join(file);
        fs::remove_file(&p).ok();
        p.to_string_lossy().to_string()
    }
}
