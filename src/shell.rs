//! Line-oriented terminal host for the query pages.
//!
//! Each command maps onto one controller: the argument is fed through
//! `on_input_change`, the controller is submitted, and the rendered page is
//! written back. Controllers live for the whole session and are unmounted
//! when the shell exits.

use std::str::FromStr;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::controller::{
    Category, Health, Info, InputMode, Locate, NlpQuery, QueryController, QueryMode,
    Recommendations, ResolutionPolicy, Route, Search, Similar,
};
use crate::gateway::Gateway;
use crate::render::{render, Present};

pub const HELP: &str = "\
Commands:
  search <term>          search products by name (at least 2 characters)
  recommend              random product recommendations
  ask <question>         parse a natural-language request
  category <name>        recommendations from one category
  info <product id>      full catalog record of a product
  similar <product id>   products sharing a category or diet tag
  locate <product id>    aisle and shelf of a product
  route <start> <end>    walking route between two locations
  health                 check the backend
  help                   show this message
  quit                   exit
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    Recommend,
    Ask(String),
    Category(String),
    Info(String),
    Similar(String),
    Locate(String),
    Route(String),
    Health,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("Unknown command '{0}'. Type 'help' for a list of commands.")]
    Unknown(String),
    #[error("'{0}' takes no arguments")]
    UnexpectedArgument(&'static str),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let no_args = |cmd: Command, name: &'static str| {
            if rest.is_empty() {
                Ok(cmd)
            } else {
                Err(CommandError::UnexpectedArgument(name))
            }
        };

        match word.to_ascii_lowercase().as_str() {
            "search" | "s" => Ok(Command::Search(rest.to_string())),
            "ask" | "nlp" => Ok(Command::Ask(rest.to_string())),
            "category" => Ok(Command::Category(rest.to_string())),
            "info" => Ok(Command::Info(rest.to_string())),
            "similar" | "like" => Ok(Command::Similar(rest.to_string())),
            "locate" | "where" => Ok(Command::Locate(rest.to_string())),
            "route" => Ok(Command::Route(rest.to_string())),
            "recommend" | "r" => no_args(Command::Recommend, "recommend"),
            "health" => no_args(Command::Health, "health"),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// One mounted controller per page.
pub struct Shell {
    search: QueryController<Search>,
    recommendations: QueryController<Recommendations>,
    nlp: QueryController<NlpQuery>,
    category: QueryController<Category>,
    info: QueryController<Info>,
    similar: QueryController<Similar>,
    locate: QueryController<Locate>,
    route: QueryController<Route>,
    health: QueryController<Health>,
}

impl Shell {
    pub fn new(gateway: Arc<dyn Gateway>, policy: ResolutionPolicy) -> Self {
        Self {
            search: QueryController::new(Search, gateway.clone(), policy),
            recommendations: QueryController::new(Recommendations, gateway.clone(), policy),
            nlp: QueryController::new(NlpQuery, gateway.clone(), policy),
            category: QueryController::new(Category, gateway.clone(), policy),
            info: QueryController::new(Info, gateway.clone(), policy),
            similar: QueryController::new(Similar, gateway.clone(), policy),
            locate: QueryController::new(Locate, gateway.clone(), policy),
            route: QueryController::new(Route, gateway.clone(), policy),
            health: QueryController::new(Health, gateway, policy),
        }
    }

    /// Run one command and return the text to show. `None` means quit.
    pub async fn execute(&self, command: Command) -> Option<String> {
        let output = match command {
            Command::Search(term) => with_input(&self.search, term).await,
            Command::Ask(text) => with_input(&self.nlp, text).await,
            Command::Category(name) => with_input(&self.category, name).await,
            Command::Info(id) => with_input(&self.info, id).await,
            Command::Similar(id) => with_input(&self.similar, id).await,
            Command::Locate(id) => with_input(&self.locate, id).await,
            Command::Route(endpoints) => with_input(&self.route, endpoints).await,
            Command::Recommend => submit_and_render(&self.recommendations).await,
            Command::Health => submit_and_render(&self.health).await,
            Command::Help => HELP.to_string(),
            Command::Quit => return None,
        };
        Some(output)
    }

    /// Read commands until EOF or `quit`, writing each page to `output`.
    /// The controllers are unmounted on every exit path, including I/O errors.
    pub async fn run<R, W>(&self, input: R, output: W) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let result = self.session(input, output).await;
        self.unmount();
        if let Err(e) = &result {
            tracing::warn!("Shell stopped: {e}");
        }
        result
    }

    async fn session<R, W>(&self, input: R, mut output: W) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        output.write_all(b"> ").await?;
        output.flush().await?;

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                output.write_all(b"> ").await?;
                output.flush().await?;
                continue;
            }

            let text = match line.parse::<Command>() {
                Ok(command) => match self.execute(command).await {
                    Some(text) => text,
                    None => break,
                },
                Err(e) => format!("{e}\n"),
            };

            output.write_all(text.as_bytes()).await?;
            output.write_all(b"> ").await?;
            output.flush().await?;
        }
        Ok(())
    }

    /// True while any page can still accept results.
    pub fn is_mounted(&self) -> bool {
        self.search.is_mounted()
            || self.recommendations.is_mounted()
            || self.nlp.is_mounted()
            || self.category.is_mounted()
            || self.info.is_mounted()
            || self.similar.is_mounted()
            || self.locate.is_mounted()
            || self.route.is_mounted()
            || self.health.is_mounted()
    }

    pub fn unmount(&self) {
        self.search.unmount();
        self.recommendations.unmount();
        self.nlp.unmount();
        self.category.unmount();
        self.info.unmount();
        self.similar.unmount();
        self.locate.unmount();
        self.route.unmount();
        self.health.unmount();
    }
}

async fn with_input<M>(controller: &QueryController<M>, text: String) -> String
where
    M: InputMode,
    M::Output: Present,
{
    controller.on_input_change(text);
    submit_and_render(controller).await
}

async fn submit_and_render<M>(controller: &QueryController<M>) -> String
where
    M: QueryMode,
    M::Output: Present,
{
    if let Err(notice) = controller.submit().await {
        return format!("! {notice}\n");
    }
    let page = render(&controller.current_state());
    if page.is_empty() && page.notice.is_none() {
        return "No results.\n".to_string();
    }
    page.to_string()
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use super::*;
    use crate::gateway::HttpGateway;

    /// Writer whose every call fails, like a closed terminal.
    struct BrokenPipe;

    impl AsyncWrite for BrokenPipe {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed")))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed")))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    fn offline_shell() -> Shell {
        // Nothing listens here; the tests below never reach the backend.
        let gateway = HttpGateway::with_client(reqwest::Client::new(), "http://127.0.0.1:9");
        Shell::new(Arc::new(gateway), ResolutionPolicy::default())
    }

    #[tokio::test]
    async fn test_write_failure_still_unmounts_controllers() {
        let shell = offline_shell();
        assert!(shell.is_mounted());

        let result = shell.run("help\n".as_bytes(), BrokenPipe).await;

        assert!(result.is_err());
        assert!(!shell.is_mounted());
    }

    #[tokio::test]
    async fn test_eof_unmounts_controllers() {
        let shell = offline_shell();
        let mut out = Vec::new();
        shell.run("help\nquit\n".as_bytes(), &mut out).await.unwrap();

        assert!(!shell.is_mounted());
        assert!(String::from_utf8(out).unwrap().contains("similar <product id>"));
    }

    #[test]
    fn test_parse_product_id_commands() {
        assert_eq!("info p9".parse::<Command>(), Ok(Command::Info("p9".into())));
        assert_eq!(
            "similar  p9 ".parse::<Command>(),
            Ok(Command::Similar("p9".into()))
        );
        assert_eq!("like p9".parse::<Command>(), Ok(Command::Similar("p9".into())));
    }

    #[tokio::test]
    async fn test_blank_product_id_is_rejected_inline() {
        let shell = offline_shell();
        let text = shell.execute(Command::Info(String::new())).await.unwrap();
        assert_eq!(text, "! Enter a product id\n");
        let text = shell.execute(Command::Similar("  ".into())).await.unwrap();
        assert_eq!(text, "! Enter a product id\n");
    }

    #[test]
    fn test_parse_commands_with_arguments() {
        assert_eq!(
            "search apple".parse::<Command>(),
            Ok(Command::Search("apple".into()))
        );
        assert_eq!(
            "  ask   where is the milk  ".parse::<Command>(),
            Ok(Command::Ask("where is the milk".into()))
        );
        assert_eq!(
            "route entrance A4".parse::<Command>(),
            Ok(Command::Route("entrance A4".into()))
        );
        assert_eq!(
            "LOCATE p42".parse::<Command>(),
            Ok(Command::Locate("p42".into()))
        );
    }

    #[test]
    fn test_parse_search_without_term_is_left_to_validation() {
        assert_eq!("search".parse::<Command>(), Ok(Command::Search(String::new())));
    }

    #[test]
    fn test_parse_commands_without_arguments() {
        assert_eq!("recommend".parse::<Command>(), Ok(Command::Recommend));
        assert_eq!("health".parse::<Command>(), Ok(Command::Health));
        assert_eq!("quit".parse::<Command>(), Ok(Command::Quit));
        assert_eq!("?".parse::<Command>(), Ok(Command::Help));
    }

    #[test]
    fn test_parse_rejects_arguments_to_recommend() {
        assert_eq!(
            "recommend dairy".parse::<Command>(),
            Err(CommandError::UnexpectedArgument("recommend"))
        );
    }

    #[test]
    fn test_parse_unknown_command() {
        let err = "checkout".parse::<Command>().unwrap_err();
        assert_eq!(err, CommandError::Unknown("checkout".into()));
        assert!(err.to_string().contains("help"));
    }
}
