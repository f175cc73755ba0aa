use crate::BackupWorld;
use cucumber::gherkin::Step;
use cucumber::{given, then, when};
use issue_backup::cli::parser::Cli;
use serde_json::{Value, json};
use std::io::{self, Write};
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PER_PAGE: usize = 100;

async fn mock_server(world: &mut BackupWorld) -> &MockServer {
    if world.server.is_none() {
        world.server = Some(MockServer::start().await);
    }
    world.server.as_ref().expect("server started above")
}

fn issue_json(number: u64, comments: u64) -> Value {
    json!({
        "number": number,
        "title": format!("Issue {number}"),
        "state": "open",
        "comments": comments,
        "pull_request": null
    })
}

fn comment_json(issue_number: u64, id: u64) -> Value {
    json!({
        "id": issue_number * 1000 + id,
        "body": format!("comment {id} on issue {issue_number}")
    })
}

/// Mounts the issue listing, split into pages of `PER_PAGE`.
async fn mount_issues(server: &MockServer, owner_repo: &str, issues: &[(u64, u64)]) {
    let route = format!("/repos/{owner_repo}/issues");
    let pages: Vec<&[(u64, u64)]> = if issues.is_empty() {
        vec![issues]
    } else {
        issues.chunks(PER_PAGE).collect()
    };

    for (index, page) in pages.iter().enumerate() {
        let page_number = index + 1;
        let body: Vec<Value> = page
            .iter()
            .map(|(number, comments)| issue_json(*number, *comments))
            .collect();
        let mut response = ResponseTemplate::new(200).set_body_json(body);
        if page_number < pages.len() {
            let link = format!(
                r#"<{}{}?state=all&per_page=100&page={}>; rel="next""#,
                server.uri(),
                route,
                page_number + 1
            );
            response = response.insert_header("link", link.as_str());
        }
        Mock::given(method("GET"))
            .and(path(route.as_str()))
            .and(query_param("page", page_number.to_string()))
            .respond_with(response)
            .mount(server)
            .await;
    }

    for (number, comments) in issues.iter().filter(|(_, comments)| *comments > 0) {
        let body: Vec<Value> = (1..=*comments).map(|id| comment_json(*number, id)).collect();
        Mock::given(method("GET"))
            .and(path(format!("/repos/{owner_repo}/issues/{number}/comments")))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }
}

fn cli_for(world: &BackupWorld, owner_repo: &str) -> Cli {
    let (owner, repo) = owner_repo
        .split_once('/')
        .expect("repository must be given as owner/repo");
    Cli {
        owner: Some(owner.to_string()),
        repo: Some(repo.to_string()),
        token: Some("test-token".to_string()),
        quiet: true,
        config: None,
        api_url: world.server.as_ref().map(MockServer::uri),
        state: None,
    }
}

fn records(output: &[u8]) -> Vec<Value> {
    String::from_utf8(output.to_vec())
        .expect("Invalid UTF-8")
        .split("\n\n")
        .filter(|chunk| !chunk.trim().is_empty())
        .map(|chunk| serde_json::from_str(chunk).expect("each record should be valid JSON"))
        .collect()
}

struct ClosedOutput;

impl Write for ClosedOutput {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "output closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[given(regex = r#"^the repository "(.*)" has the issues$"#)]
async fn given_repository_with_issues(world: &mut BackupWorld, owner_repo: String, step: &Step) {
    let table = step.table.as_ref().expect("issues table required");
    let issues: Vec<(u64, u64)> = table
        .rows
        .iter()
        .skip(1)
        .map(|row| {
            (
                row[0].parse().expect("issue number"),
                row[1].parse().expect("comment count"),
            )
        })
        .collect();

    let server = mock_server(world).await;
    mount_issues(server, &owner_repo, &issues).await;
}

#[given(regex = r#"^the repository "(.*)" has (\d+) issues without comments$"#)]
async fn given_repository_with_uncommented_issues(
    world: &mut BackupWorld,
    owner_repo: String,
    count: u64,
) {
    let issues: Vec<(u64, u64)> = (1..=count).map(|number| (number, 0)).collect();
    let server = mock_server(world).await;
    mount_issues(server, &owner_repo, &issues).await;
}

#[given(regex = r#"^the repository "(.*)" does not exist$"#)]
async fn given_repository_missing(world: &mut BackupWorld, owner_repo: String) {
    let server = mock_server(world).await;
    Mock::given(method("GET"))
        .and(path(format!("/repos/{owner_repo}/issues")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
        .mount(server)
        .await;
}

#[given(regex = r#"^the first issues request is rate limited for (\d+) seconds?$"#)]
async fn given_first_request_rate_limited(world: &mut BackupWorld, seconds: u64) {
    let server = mock_server(world).await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/repos/[^/]+/[^/]+/issues$"))
        .respond_with(
            ResponseTemplate::new(403)
                .insert_header("retry-after", seconds.to_string().as_str())
                .set_body_json(json!({"message": "You have exceeded a secondary rate limit."})),
        )
        .up_to_n_times(1)
        .with_priority(1)
        .mount(server)
        .await;
}

#[given(regex = r#"^the comments of issue #(\d+) fail with status (\d+)$"#)]
async fn given_comments_fail(world: &mut BackupWorld, number: u64, status: u16) {
    let server = mock_server(world).await;
    Mock::given(method("GET"))
        .and(path_regex(format!(r"^/repos/[^/]+/[^/]+/issues/{number}/comments$")))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({"message": "boom"})))
        .with_priority(1)
        .mount(server)
        .await;
}

#[when(regex = r#"^I back up "([^"]*)"$"#)]
async fn when_back_up(world: &mut BackupWorld, owner_repo: String) {
    let cli = cli_for(world, &owner_repo);
    let mut output = Vec::new();
    let result = issue_backup::run::run(cli, &mut output).await.map(|_| ());
    world.captured_output = output;
    world.backup_result = Some(result);
}

#[when(regex = r#"^I back up "([^"]*)" into a closed output$"#)]
async fn when_back_up_into_closed_output(world: &mut BackupWorld, owner_repo: String) {
    let cli = cli_for(world, &owner_repo);
    let result = issue_backup::run::run(cli, &mut ClosedOutput).await.map(|_| ());
    world.backup_result = Some(result);
}

#[when(regex = r#"^I back up "([^"]*)" twice$"#)]
async fn when_back_up_twice(world: &mut BackupWorld, owner_repo: String) {
    let mut first = Vec::new();
    issue_backup::run::run(cli_for(world, &owner_repo), &mut first)
        .await
        .expect("first backup should succeed");
    let mut second = Vec::new();
    issue_backup::run::run(cli_for(world, &owner_repo), &mut second)
        .await
        .expect("second backup should succeed");
    world.captured_output = first;
    world.second_output = Some(second);
}

#[then("the backup should succeed")]
async fn then_backup_succeeds(world: &mut BackupWorld) {
    match &world.backup_result {
        Some(Ok(())) => {}
        other => panic!("Expected the backup to succeed, got {other:?}"),
    }
}

#[then(regex = r#"^the backup should fail with "(.*)"$"#)]
async fn then_backup_fails(world: &mut BackupWorld, expected: String) {
    match &world.backup_result {
        Some(Err(err)) => {
            let message = format!("{err:#}");
            assert!(
                message.contains(&expected),
                "Expected error containing '{expected}', got '{message}'"
            );
        }
        other => panic!("Expected the backup to fail, got {other:?}"),
    }
}

#[then(regex = r#"^the output should contain (\d+) records$"#)]
async fn then_output_record_count(world: &mut BackupWorld, count: usize) {
    assert_eq!(records(&world.captured_output).len(), count);
}

#[then(regex = r#"^record (\d+) should be issue #(\d+)$"#)]
async fn then_record_is_issue(world: &mut BackupWorld, index: usize, number: u64) {
    let records = records(&world.captured_output);
    let record = &records[index - 1];
    assert!(record.is_object(), "record {index} is not an issue: {record}");
    assert_eq!(record["number"], json!(number));
}

#[then(regex = r#"^record (\d+) should be a list of (\d+) comments$"#)]
async fn then_record_is_comment_list(world: &mut BackupWorld, index: usize, count: usize) {
    let records = records(&world.captured_output);
    let comments = records[index - 1]
        .as_array()
        .unwrap_or_else(|| panic!("record {index} is not a comment list"));
    assert_eq!(comments.len(), count);
}

#[then(regex = r#"^the issue numbers should run from (\d+) to (\d+) in order$"#)]
async fn then_issue_numbers_in_order(world: &mut BackupWorld, first: u64, last: u64) {
    let numbers: Vec<u64> = records(&world.captured_output)
        .iter()
        .map(|record| record["number"].as_u64().expect("issue number"))
        .collect();
    assert_eq!(numbers, (first..=last).collect::<Vec<u64>>());
}

#[then(regex = r#"^no comments should have been requested for issue #(\d+)$"#)]
async fn then_no_comment_request(world: &mut BackupWorld, number: u64) {
    let server = world.server.as_ref().expect("mock server running");
    let requests = server
        .received_requests()
        .await
        .expect("request recording enabled");
    let comments_path = format!("/issues/{number}/comments");
    assert!(
        requests
            .iter()
            .all(|request| !request.url.path().ends_with(&comments_path)),
        "comments of issue #{number} were requested"
    );
}

#[then("both backups should be identical")]
async fn then_backups_identical(world: &mut BackupWorld) {
    let second = world
        .second_output
        .as_ref()
        .expect("second backup output captured");
    assert!(!world.captured_output.is_empty());
    assert_eq!(&world.captured_output, second);
}
