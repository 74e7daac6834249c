#[cfg(target_os = "linux")]
use sqlhttp_driver::{Connection, Driver, Endpoint, Identity, Value};
#[cfg(target_os = "linux")]
use testcontainers::runners::AsyncRunner;

#[cfg(target_os = "linux")]
#[tokio::test]
#[ignore = "requires a docker daemon"]
async fn test_mysql_driver() -> anyhow::Result<()> {
    let image =
        testcontainers::ContainerRequest::from(testcontainers_modules::mysql::Mysql::default());
    let container = image.start().await?;
    let port = container.get_host_port_ipv4(3306).await?;

    let driver = sqlhttp_driver_mysql::Driver;
    let identity = Identity::new("mysql", "root", "");
    let endpoint = Endpoint::new("127.0.0.1").with_port(Some(port));
    let url = driver.url(&identity, &endpoint)?;
    let connection = driver.connect(url.as_str()).await?;
    connection.ping().await?;

    test_connection_interface(&*connection).await?;
    test_text_values(&*connection).await?;
    connection.close().await?;

    container.stop().await?;
    container.rm().await?;
    Ok(())
}

#[cfg(target_os = "linux")]
async fn test_connection_interface(connection: &dyn Connection) -> anyhow::Result<()> {
    let _ = connection
        .execute(
            "CREATE TABLE person (id INTEGER AUTO_INCREMENT PRIMARY KEY, name VARCHAR(20))",
        )
        .await?;

    let result = connection
        .execute("INSERT INTO person (name) VALUES ('foo')")
        .await?;
    assert_eq!(result.last_insert_id()?, 1);
    assert_eq!(result.rows_affected()?, 1);

    let _ = connection
        .execute("INSERT INTO person (name) VALUES (NULL)")
        .await?;

    let mut query_result = connection
        .query("SELECT id, name FROM person ORDER BY id")
        .await?;
    assert_eq!(query_result.columns(), vec!["id", "name"]);
    assert_eq!(
        query_result.next().await?.cloned(),
        Some(vec![Value::from("1"), Value::from("foo")])
    );
    assert_eq!(
        query_result.next().await?.cloned(),
        Some(vec![Value::from("2"), Value::Null])
    );
    assert!(query_result.next().await?.is_none());

    let query_result = connection
        .query("SELECT id, name FROM person WHERE id < 0")
        .await?;
    assert_eq!(query_result.columns(), vec!["id", "name"]);

    Ok(())
}

#[cfg(target_os = "linux")]
async fn test_text_values(connection: &dyn Connection) -> anyhow::Result<()> {
    let mut query_result = connection
        .query("SELECT 1.50, DATE('2024-01-02'), x'2a', CAST(NULL AS CHAR)")
        .await?;
    assert_eq!(
        query_result.next().await?.cloned(),
        Some(vec![
            Value::from("1.50"),
            Value::from("2024-01-02"),
            Value::from("*"),
            Value::Null,
        ])
    );
    Ok(())
}
