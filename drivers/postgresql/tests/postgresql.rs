#[cfg(target_os = "linux")]
use sqlhttp_driver::{Connection, Driver, Endpoint, Error, Identity, Value};
#[cfg(target_os = "linux")]
use testcontainers::runners::AsyncRunner;

#[cfg(target_os = "linux")]
#[tokio::test]
#[ignore = "requires a docker daemon"]
async fn test_postgresql_driver() -> anyhow::Result<()> {
    let image = testcontainers::ContainerRequest::from(
        testcontainers_modules::postgres::Postgres::default(),
    );
    let container = image.start().await?;
    let port = container.get_host_port_ipv4(5432).await?;

    let driver = sqlhttp_driver_postgresql::Driver;
    let identity = Identity::new("postgres", "postgres", "postgres");
    let endpoint = Endpoint::new("127.0.0.1").with_port(Some(port));
    let url = driver.url(&identity, &endpoint)?;
    let connection = driver.connect(url.as_str()).await?;
    connection.ping().await?;

    test_connection_interface(&*connection).await?;
    connection.close().await?;

    container.stop().await?;
    container.rm().await?;
    Ok(())
}

#[cfg(target_os = "linux")]
async fn test_connection_interface(connection: &dyn Connection) -> anyhow::Result<()> {
    let _ = connection
        .execute("CREATE TABLE person (id SERIAL PRIMARY KEY, name VARCHAR(20))")
        .await?;

    let result = connection
        .execute("INSERT INTO person (name) VALUES ('foo'), (NULL)")
        .await?;
    assert_eq!(result.rows_affected()?, 2);
    assert!(matches!(result.last_insert_id(), Err(Error::Unsupported(_))));

    let mut query_result = connection
        .query("SELECT id, name, 1.50::numeric AS amount FROM person ORDER BY id")
        .await?;
    assert_eq!(query_result.columns(), vec!["id", "name", "amount"]);
    assert_eq!(
        query_result.next().await?.cloned(),
        Some(vec![Value::from("1"), Value::from("foo"), Value::from("1.50")])
    );
    assert_eq!(
        query_result.next().await?.cloned(),
        Some(vec![Value::from("2"), Value::Null, Value::from("1.50")])
    );
    assert!(query_result.next().await?.is_none());

    let query_result = connection
        .query("SELECT id, name FROM person WHERE id < 0")
        .await?;
    assert_eq!(query_result.columns(), vec!["id", "name"]);
    Ok(())
}
