#![feature(custom_test_frameworks)]
#![test_runner(e2e_test_runner)]

pub mod outcomes_page;
pub mod playwright_ext;
mod report;

use anyhow::Result;
use async_trait::async_trait;
use futures::{stream, FutureExt, StreamExt};
use playwright::{
    api::{Browser, Page},
    Playwright,
};
use std::{
    any::type_name,
    env,
    fmt::{Display, Formatter},
    future::Future,
    panic::AssertUnwindSafe,
    process::{Child, Command, Stdio},
    time::Duration,
};
use tokio::{net::TcpStream, runtime::Runtime, time::sleep};
use url::Url;

use crate::report::{CaughtPanic, ErrorList, SetupFailure, TestResult};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
const BASE_URL_VAR: &str = "E2E_BASE_URL";
const SERVER_ATTEMPTS: usize = 600;

/// Where the outcomes app is served, `E2E_BASE_URL` or the local default.
pub fn base_url() -> String {
    env::var(BASE_URL_VAR).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
}

/// The `host:port` a connection to `base_url` goes to. Without an explicit
/// port the scheme's default is used.
pub fn server_address(base_url: &str) -> Result<String> {
    let url = Url::parse(base_url)?;
    let invalid = || SetupFailure::InvalidBaseUrl(base_url.to_string());
    let host = url.host_str().ok_or_else(invalid)?;
    let port = url.port_or_known_default().ok_or_else(invalid)?;
    Ok(format!("{}:{}", host, port))
}

pub fn e2e_test_runner(tests: &[&dyn Testable]) {
    // An app at `E2E_BASE_URL` is already running somewhere else.
    let mut web_server = if env::var_os(BASE_URL_VAR).is_some() {
        None
    } else {
        match start_web_server() {
            Ok(child) => Some(child),
            Err(err) => {
                println!("Failed to start the web app: {:#?}", err);
                std::process::exit(1);
            }
        }
    };

    let exit_code = match Runtime::new() {
        Ok(runtime) => match runtime.block_on(run_tests(tests)) {
            Ok(test_results) => summarize(&test_results),
            Err(error) => {
                println!("{:#?}", error);
                1
            }
        },
        Err(error) => {
            println!("Failed to start the runtime: {:#?}", error);
            1
        }
    };

    if let Some(Err(err)) = web_server.as_mut().map(Child::kill) {
        println!("Failed to stop the web app: {}", err);
    }

    std::process::exit(exit_code);
}

fn start_web_server() -> std::io::Result<Child> {
    Command::new("cargo")
        .args(["run", "-p", "web"])
        .current_dir("..")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
}

fn summarize(test_results: &[TestResult]) -> i32 {
    println!("\nSummary:");

    for test_result in test_results {
        println!("{}", test_result);
    }

    let successes = test_results
        .iter()
        .filter(|test_result| test_result.result.is_ok())
        .count();
    if successes == test_results.len() {
        println!("{} tests ran with success", successes);
        0
    } else {
        println!("{} errors", test_results.len() - successes);
        1
    }
}

/// Waits until the app accepts connections; `cargo run` may still be compiling.
async fn wait_for_server(base_url: &str) -> Result<()> {
    let address = server_address(base_url)?;
    for _ in 0..SERVER_ATTEMPTS {
        if TcpStream::connect(address.as_str()).await.is_ok() {
            return Ok(());
        }
        sleep(Duration::from_millis(500)).await;
    }
    Err(SetupFailure::ServerUnreachable(address).into())
}

async fn launch_browsers(
    playwright: &Playwright,
) -> Result<Vec<(BrowserType, Browser)>, ErrorList<SetupFailure>> {
    let mut browsers = Vec::new();
    let mut errors: Option<ErrorList<SetupFailure>> = None;

    for &browser_type in BrowserType::ALL.iter() {
        let launched = match browser_type {
            BrowserType::Chromium => playwright.chromium(),
            BrowserType::Firefox => playwright.firefox(),
            BrowserType::Webkit => playwright.webkit(),
        }
        .launcher()
        .headless(true)
        .launch()
        .await;

        match launched {
            Ok(browser) => browsers.push((browser_type, browser)),
            Err(err) => {
                if let Some(errs) = &mut errors {
                    errs.push(SetupFailure::Initialize(browser_type), err);
                } else {
                    errors = Some(ErrorList::new(SetupFailure::Initialize(browser_type), err));
                }
            }
        }
    }

    match errors {
        Some(errors) => Err(errors),
        None => Ok(browsers),
    }
}

async fn run_tests(tests: &[&dyn Testable]) -> Result<Vec<TestResult>> {
    let base_url = base_url();
    wait_for_server(&base_url).await?;

    let playwright = Playwright::initialize().await?;
    playwright.prepare()?; // Install browsers
    let browsers = launch_browsers(&playwright).await?;

    let base_url = &base_url;
    let (results, error_list) = stream::iter(tests)
        .flat_map(|test| {
            stream::iter(browsers.iter()).map(move |(browser_type, browser)| async move {
                let browser_type = *browser_type;
                let test_name = test.name();
                let open_failed = |err| {
                    (
                        SetupFailure::OpenPage {
                            browser_type,
                            test_name,
                        },
                        err,
                    )
                };
                let context = browser.context_builder().build().await.map_err(open_failed)?;
                let page = context.new_page().await.map_err(open_failed)?;
                let ctx = Context {
                    page,
                    base_url: base_url.clone(),
                    browser_type,
                };
                Ok(test
                    .run(ctx)
                    .map(|result| TestResult {
                        test_name,
                        browser_type,
                        result,
                    })
                    .inspect(|test_result| println!("{}", test_result))
                    .await)
            })
        })
        .fold(
            (Vec::new(), None),
            |(mut test_results, errors), result| async {
                match (result.await, errors) {
                    (Ok(test_result), errors) => {
                        test_results.push(test_result);
                        (test_results, errors)
                    }
                    (Err((context, err)), None) => {
                        (test_results, Some(ErrorList::new(context, err)))
                    }
                    (Err((context, err)), Some(mut error_list)) => {
                        error_list.push(context, err);
                        (test_results, Some(error_list))
                    }
                }
            },
        )
        .await;

    if let Some(error_list) = error_list {
        return Err(error_list.into());
    }

    Ok(results)
}

#[derive(Debug, Copy, Clone, PartialOrd, PartialEq, Eq, Hash)]
pub enum BrowserType {
    Chromium,
    Firefox,
    Webkit,
}

impl BrowserType {
    const ALL: [BrowserType; 3] = [
        BrowserType::Chromium,
        BrowserType::Firefox,
        BrowserType::Webkit,
    ];
}

impl Display for BrowserType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                BrowserType::Chromium => "Chromium",
                BrowserType::Firefox => "Firefox",
                BrowserType::Webkit => "Webkit",
            }
        )
    }
}

/// A fresh browser context per test and browser, so every run gets its own
/// client cookie and therefore its own editor session.
pub struct Context {
    pub page: Page,
    pub base_url: String,
    pub browser_type: BrowserType,
}

#[async_trait]
pub trait Testable {
    fn name(&self) -> &'static str;
    async fn run(&self, ctx: Context) -> Result<()>;
}

#[async_trait]
impl<F, FF> Testable for F
where
    F: Fn(Context) -> FF + Sync,
    FF: Send,
    AssertUnwindSafe<FF>: Future<Output = Result<()>>,
{
    fn name(&self) -> &'static str {
        type_name::<Self>()
    }

    async fn run(&self, ctx: Context) -> Result<()> {
        let result = AssertUnwindSafe(self(ctx)).catch_unwind().await;
        match result {
            Ok(future) => future,
            Err(err) => Err(CaughtPanic::new(err).into()),
        }
    }
}
