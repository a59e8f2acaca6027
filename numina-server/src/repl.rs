//! Line-oriented interactive session
//!
//! Each line is evaluated in one `Session`, so `Ans` refers to the last
//! numeric result. `clear` forgets it; `exit` or `quit` ends the session.

use numina::{Calculator, Formatter, Session};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Run a session over arbitrary line input and output
pub async fn run<R, W>(calculator: Calculator, input: R, mut output: W, show_metrics: bool) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut session = Session::new(calculator);
    let formatter = Formatter::new();
    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line {
            "" => continue,
            "exit" | "quit" => break,
            "clear" => {
                session.clear();
                output.write_all(b"Ans cleared\n").await?;
                continue;
            }
            _ => {}
        }

        let evaluation = session.evaluate(line).await;
        let mut text = formatter.format_result(&evaluation.result);
        text.push('\n');
        if show_metrics {
            text.push_str(&formatter.format_metrics(&evaluation.metrics));
            text.push('\n');
        }
        output.write_all(text.as_bytes()).await?;
        output.flush().await?;
    }
    Ok(())
}

/// Session on the process's stdin and stdout
pub async fn run_stdio(calculator: Calculator, show_metrics: bool) -> std::io::Result<()> {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    run(calculator, stdin, tokio::io::stdout(), show_metrics).await
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn transcript(input: &str, show_metrics: bool) -> String {
        let mut out = Vec::new();
        run(Calculator::numeric_only(), input.as_bytes(), &mut out, show_metrics)
            .await
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn test_ans_carries_between_lines() {
        let out = transcript("2+3\nAns*2\n1/0\nAns+1\n", false).await;
        assert_eq!(out, "5\n10\nError: Division by zero\n11\n");
    }

    #[tokio::test]
    async fn test_clear_and_exit() {
        let out = transcript("7\nclear\nAns\nexit\n1+1\n", false).await;
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "7");
        assert_eq!(lines[1], "Ans cleared");
        assert!(lines[2].starts_with("Error: "));
        assert_eq!(lines.len(), 3);
    }

    #[tokio::test]
    async fn test_metrics_report() {
        let out = transcript("\n2^10\n", true).await;
        assert!(out.starts_with("1024\nParse time: "));
        assert!(out.contains("AST nodes: 3"));
    }
}
